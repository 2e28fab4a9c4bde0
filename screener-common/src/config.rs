//! Shared configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "SCREENER_CONFIG_DIR";

/// Get the configuration directory.
///
/// `SCREENER_CONFIG_DIR` wins; otherwise `~/.screener`, or `.screener`
/// relative to the working directory when no home directory is known.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".screener"),
        |dirs| dirs.home_dir().join(".screener"),
    )
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Aliases: "level"
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    /// Aliases: "format"
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl ObservabilityConfig {
    /// Apply `SCREENER_LOG_LEVEL` / `SCREENER_LOG_FORMAT` overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("SCREENER_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(format) = std::env::var("SCREENER_LOG_FORMAT") {
            self.log_format = format;
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
