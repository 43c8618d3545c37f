//! `starshot.toml` loading.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const FILE_NAME: &str = "starshot.toml";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("invalid config {path}: {error}")]
    Toml {
        path: PathBuf,
        error: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub check: CheckConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Whether diagnostics block compilation and execution.
    pub deny: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self { deny: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// A `tracing-subscriber` filter directive such as `starshot=debug`.
    pub filter: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        toml::from_str(&content).map_err(|error| ConfigError::Toml {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Load `starshot.toml` from `dir`, or the defaults when there is none.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = dir.as_ref().join(FILE_NAME);
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn log_filter(&self) -> &str {
        self.log.filter.as_deref().unwrap_or("starshot=info")
    }
}
