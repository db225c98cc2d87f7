use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;
use crate::fetch::Window;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/makub/config.toml` on Unix/macOS, or the equivalent
    /// on other platforms via `dirs::config_dir()`. Falls back to the
    /// current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("makub").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - Page size and increment keep every window non-degenerate
    /// - A configured cycle timeout is not zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        Window::initial(self.pagination.page_size).map_err(|e| ConfigError::ValidationError {
            message: format!("pagination.page_size: {}", e),
        })?;
        Window::check_increment(self.pagination.increment).map_err(|e| {
            ConfigError::ValidationError {
                message: format!("pagination.increment: {}", e),
            }
        })?;

        if self.coordinator.cycle_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "coordinator.cycle_timeout_ms must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}
