//! Application configuration.
//!
//! Loaded from the config directory (`config.json`, with `criteria.json`
//! merged under `screener.criteria`), then environment overrides, then
//! validation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use screener_common::config_loader::load_modular_config;
use screener_common::validation::collect;
use screener_common::{ObservabilityConfig, Validate, ValidationResult};

use crate::screener::ScreenerConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub screener: ScreenerConfig,
}

impl Config {
    /// Load from `dir` (default: the shared config directory), apply
    /// environment overrides and validate.
    pub fn load(dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load_files(dir)?;
        config.apply_env_overrides();
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Load from config files only. Missing files mean defaults.
    pub fn load_files(dir: Option<PathBuf>) -> Result<Self> {
        let value = load_modular_config(dir)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).context("Failed to parse configuration")
    }

    pub fn apply_env_overrides(&mut self) {
        self.observability.apply_env_overrides();
        self.screener.criteria.apply_env_overrides();
    }
}

impl Validate for Config {
    fn validate(&self) -> ValidationResult<()> {
        let errors = [self.observability.validate(), self.screener.validate()]
            .into_iter()
            .filter_map(Result::err)
            .collect();

        collect(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_dir_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_files(Some(dir.path().join("absent"))).unwrap();
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.screener.top_n, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_criteria_file_merges() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{"observability": {"level": "debug"}, "screener": {"top_n": 5, "criteria": {"min_eps": 2.0}}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("criteria.json"), r#"{"min_yoy_growth": 15.0}"#).unwrap();

        let config = Config::load_files(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.screener.top_n, 5);
        assert_eq!(config.screener.criteria.min_eps, 2.0);
        assert_eq!(config.screener.criteria.min_yoy_growth, 15.0);
        assert_eq!(config.screener.criteria.min_eps_growth, 100.0);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), "{ not json").unwrap();
        assert!(Config::load_files(Some(dir.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_validation_collects_sections() {
        let mut config = Config::default();
        config.observability.log_format = "xml".into();
        config.screener.top_n = 0;
        assert!(matches!(
            config.validate(),
            Err(screener_common::ValidationError::Multiple(ref e)) if e.len() == 2
        ));
    }
}
