//! Terminal styling for diagnostics.

use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};

use lazy_static::lazy_static;
use nu_ansi_term::{Color, Style};

use crate::RequestedColorMode;

lazy_static! {
    pub(crate) static ref ERROR_INDICATOR: Style = Color::Red.bold();
    pub(crate) static ref WARNING_INDICATOR: Style = Color::Yellow.bold();
    pub(crate) static ref MESSAGE_TEXT: Style = Color::Default.bold();
}

static USE_COLOR: AtomicBool = AtomicBool::new(true);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ColorMode {
    On,
    Off,
}

impl ColorMode {
    /// Honors an explicit request. Otherwise color is used when stdout is a terminal
    /// and `NO_COLOR` is unset.
    pub(crate) fn resolve(requested: RequestedColorMode) -> ColorMode {
        match requested {
            RequestedColorMode::On => ColorMode::On,
            RequestedColorMode::Off => ColorMode::Off,
            RequestedColorMode::Auto => {
                if std::env::var_os("NO_COLOR").is_some() || !io::stdout().is_terminal() {
                    ColorMode::Off
                } else {
                    ColorMode::On
                }
            }
        }
    }
}

pub(crate) fn configure_color(mode: ColorMode) {
    USE_COLOR.store(mode == ColorMode::On, Ordering::Relaxed);
}

/// Applies `style` to `text` when color is enabled.
pub(crate) fn paint(style: Style, text: &str) -> String {
    match USE_COLOR.load(Ordering::Relaxed) {
        true => style.paint(text).to_string(),
        false => text.to_string(),
    }
}
