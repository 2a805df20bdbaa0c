//! TOML configuration.
//!
//! The configuration is looked up at `~/.config/modelcat/config.toml`, then
//! `~/.modelcat.toml`, then `/etc/modelcat.toml`, unless a path is given
//! explicitly. A missing file means defaults. Unknown keys are reported and ignored.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::registry::registry::DEFAULT_FETCH_TIMEOUT;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read config \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Whether a source is used.
#[derive(Deserialize, Serialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderActivationPolicy {
    /// Used when it can be: a provider needing an API key is used when one is set
    #[default]
    Auto,
    /// Always used; a missing API key is an error
    Enabled,
    Disabled,
}

#[derive(Deserialize, Serialize, Default, Clone, Debug, PartialEq)]
pub struct RegistryConfig {
    /// Where the snapshot is saved and loaded from
    pub snapshot: Option<PathBuf>,
    pub fetch_timeout_secs: Option<u64>,
    pub refresh_timeout_secs: Option<u64>,
    /// An alias table replacing the built-in one
    pub aliases: Option<PathBuf>,
}

impl RegistryConfig {
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout_secs
            .map_or(DEFAULT_FETCH_TIMEOUT, Duration::from_secs)
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        self.refresh_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Deserialize, Serialize, Default, Clone, Debug, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub activate: ProviderActivationPolicy,
    pub api_url: Option<String>,
    pub priority: Option<u8>,
}

#[derive(Deserialize, Serialize, Default, Clone, Debug, PartialEq)]
pub struct Ollama {
    #[serde(default)]
    pub activate: ProviderActivationPolicy,
    pub api_base: Option<String>,
    pub priority: Option<u8>,
}

#[derive(Deserialize, Serialize, Default, Clone, Debug, PartialEq)]
pub struct OpenAI {
    #[serde(default)]
    pub activate: ProviderActivationPolicy,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub priority: Option<u8>,
}

#[derive(Deserialize, Serialize, Default, Clone, Debug, PartialEq)]
pub struct Providers {
    #[serde(default)]
    pub ollama: Ollama,
    #[serde(default)]
    pub openai: OpenAI,
}

#[derive(Deserialize, Serialize, Default, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub providers: Providers,
}

fn get_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME");

    if let Some(home) = home {
        let home = PathBuf::from(home);

        const USER_PATHS: [&str; 2] = [".config/modelcat/config.toml", ".modelcat.toml"];

        for &path in USER_PATHS.iter() {
            let fullpath = home.join(path);

            if fullpath.exists() {
                return Some(fullpath);
            }
        }
    }

    let system_config = PathBuf::from("/etc/modelcat.toml");

    if system_config.exists() {
        Some(system_config)
    } else {
        None
    }
}

fn extra_fields_helper<'a>(
    path: &mut Vec<&'a str>,
    user_config: &'a toml::Table,
    config: &'a toml::Table,
    extra: &mut Vec<String>,
) {
    for (user_key, user_value) in user_config {
        path.push(user_key);

        match (user_value, config.get(user_key)) {
            (toml::Value::Table(user_value), Some(toml::Value::Table(config_value))) => {
                extra_fields_helper(path, user_value, config_value, extra)
            }
            (_, Some(_)) => {}
            (_, None) => extra.push(path.join(".")),
        }

        path.pop();
    }
}

/// Returns the dotted paths of keys in `raw_config` that `config` does not use.
fn extra_fields(config: &Config, raw_config: &str) -> Vec<String> {
    let user_config: toml::Table = match toml::from_str(raw_config) {
        Ok(table) => table,
        Err(_) => return Vec::new(),
    };

    let config: toml::Table = match toml::Value::try_from(config) {
        Ok(toml::Value::Table(table)) => table,
        _ => return Vec::new(),
    };

    let mut path = Vec::new();
    let mut extra = Vec::new();

    extra_fields_helper(&mut path, &user_config, &config, &mut extra);

    extra
}

impl Config {
    pub fn from_toml(raw_config: &str) -> Result<Config, Error> {
        let config: Config = toml::from_str(raw_config)?;

        for key in extra_fields(&config, raw_config) {
            tracing::warn!(key = %key, "Config contains an extraneous key, ignoring");
        }

        Ok(config)
    }

    pub fn read(path: &Path) -> Result<Config, Error> {
        let raw_config = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&raw_config)
    }
}

/// Reads the config at `config`, or at the first default location that exists.
pub fn read_config(config: Option<PathBuf>) -> Result<Config, Error> {
    match config.or_else(get_config_path) {
        Some(path) => Config::read(&path),
        None => Ok(Config::default()),
    }
}
