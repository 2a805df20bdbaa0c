use crate::color::{paint, ERROR_INDICATOR, MESSAGE_TEXT, WARNING_INDICATOR};

pub const DEFAULT_EXIT_CODE: i32 = 1;

pub(crate) fn error_internal(text: &str) {
    eprintln!(
        "{} {}",
        paint(*ERROR_INDICATOR, "error:"),
        paint(*MESSAGE_TEXT, text)
    );
}

pub(crate) fn warn_internal(text: &str) {
    eprintln!(
        "{} {}",
        paint(*WARNING_INDICATOR, "warning:"),
        paint(*MESSAGE_TEXT, text)
    );
}

/// Prints a warning to stderr
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::warn_internal(&formatted);
    })
}

/// Prints an error to stderr and exits
#[macro_export]
macro_rules! die {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::error_internal(&formatted);
        ::std::process::exit($crate::utils::errors::DEFAULT_EXIT_CODE)
    })
}
