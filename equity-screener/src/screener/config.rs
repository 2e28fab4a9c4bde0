//! Screener configuration module.
//!
//! The tunable thresholds live in [`ScreeningCriteria`]. The stage-1 cut
//! points, the fixed tiers of stages 2 and 3 and the scoring weights are
//! part of the algorithm and are deliberately not configurable.

use serde::{Deserialize, Serialize};

use screener_common::validation::{collect, require_finite};
use screener_common::{Validate, ValidationError, ValidationResult};

// ============================================================================
// Screening Criteria
// ============================================================================

/// Named thresholds consumed by the stage evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreeningCriteria {
    /// Year-over-year growth (%) for the excellent tier
    #[serde(default = "default_min_yoy_growth")]
    pub min_yoy_growth: f64,

    /// EPS growth (%) for the excellent tier
    #[serde(default = "default_min_eps_growth")]
    pub min_eps_growth: f64,

    /// Minimum EPS (currency units) for the binary EPS check
    #[serde(default = "default_min_eps")]
    pub min_eps: f64,
}

impl Default for ScreeningCriteria {
    fn default() -> Self {
        Self {
            min_yoy_growth: default_min_yoy_growth(),
            min_eps_growth: default_min_eps_growth(),
            min_eps: default_min_eps(),
        }
    }
}

impl ScreeningCriteria {
    /// Apply `SCREENER_MIN_*` environment overrides. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        for (var, slot) in [
            ("SCREENER_MIN_YOY_GROWTH", &mut self.min_yoy_growth),
            ("SCREENER_MIN_EPS_GROWTH", &mut self.min_eps_growth),
            ("SCREENER_MIN_EPS", &mut self.min_eps),
        ] {
            if let Ok(raw) = std::env::var(var) {
                match raw.trim().parse::<f64>() {
                    Ok(value) => *slot = value,
                    Err(_) => tracing::warn!(var, value = %raw, "Ignoring unparseable override"),
                }
            }
        }
    }

    /// One-line summary for logs and report headers.
    pub fn summary(&self) -> String {
        format!(
            "YoY>={}%, EPS growth>={}%, EPS>={}",
            self.min_yoy_growth, self.min_eps_growth, self.min_eps
        )
    }
}

impl Validate for ScreeningCriteria {
    fn validate(&self) -> ValidationResult<()> {
        let errors = [
            require_finite("screener.criteria.min_yoy_growth", self.min_yoy_growth),
            require_finite("screener.criteria.min_eps_growth", self.min_eps_growth),
            require_finite("screener.criteria.min_eps", self.min_eps),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        collect(errors)
    }
}

fn default_min_yoy_growth() -> f64 {
    20.0
}

fn default_min_eps_growth() -> f64 {
    100.0
}

fn default_min_eps() -> f64 {
    1.0
}

// ============================================================================
// Main Screener Configuration
// ============================================================================

/// Configuration for a screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Thresholds for the stage evaluator
    #[serde(default)]
    pub criteria: ScreeningCriteria,

    /// Evaluate candidates on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Size of the top-picks shortlist in reports
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            criteria: ScreeningCriteria::default(),
            parallel: true,
            top_n: default_top_n(),
            output: OutputConfig::default(),
        }
    }
}

impl Validate for ScreenerConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.criteria.validate() {
            errors.push(e);
        }

        if self.top_n == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "screener.top_n".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if let Err(e) = self.output.validate() {
            errors.push(e);
        }

        collect(errors)
    }
}

fn default_true() -> bool {
    true
}

fn default_top_n() -> usize {
    3
}

// ============================================================================
// Output Configuration
// ============================================================================

/// Output configuration for screener results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Whether to save report files after each run
    #[serde(default)]
    pub local_report_enabled: bool,

    /// Directory for local reports
    #[serde(default = "default_report_dir")]
    pub report_dir: String,

    /// Report formats to generate (markdown, json, text)
    #[serde(default = "default_report_formats")]
    pub report_format: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            local_report_enabled: false,
            report_dir: default_report_dir(),
            report_format: default_report_formats(),
        }
    }
}

impl Validate for OutputConfig {
    fn validate(&self) -> ValidationResult<()> {
        let errors = self
            .report_format
            .iter()
            .filter(|f| f.parse::<super::report::ReportFormat>().is_err())
            .map(|f| ValidationError::InvalidValue {
                field: "screener.output.report_format".into(),
                reason: format!("unknown format '{}'", f),
            })
            .collect();

        collect(errors)
    }
}

fn default_report_dir() -> String {
    "reports".to_string()
}

fn default_report_formats() -> Vec<String> {
    vec!["markdown".to_string(), "json".to_string()]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScreenerConfig::default();
        assert!(config.parallel);
        assert_eq!(config.top_n, 3);
        assert!((config.criteria.min_yoy_growth - 20.0).abs() < 0.001);
        assert!((config.criteria.min_eps_growth - 100.0).abs() < 0.001);
        assert!((config.criteria.min_eps - 1.0).abs() < 0.001);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_criteria_uses_defaults() {
        let criteria: ScreeningCriteria = serde_json::from_str(r#"{"min_eps": 2.5}"#).unwrap();
        assert_eq!(criteria.min_eps, 2.5);
        assert_eq!(criteria.min_yoy_growth, 20.0);
    }

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert!(!config.local_report_enabled);
        assert_eq!(config.report_format.len(), 2);
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let config = ScreenerConfig {
            top_n: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidValue { ref field, .. }) if field == "screener.top_n"
        ));
    }

    #[test]
    fn test_non_finite_criteria_rejected() {
        let criteria = ScreeningCriteria {
            min_eps: f64::NAN,
            min_yoy_growth: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(criteria.validate(), Err(ValidationError::Multiple(ref e)) if e.len() == 2));
    }

    #[test]
    fn test_unknown_report_format_rejected() {
        let output = OutputConfig {
            report_format: vec!["markdown".into(), "pdf".into()],
            ..Default::default()
        };
        assert!(output.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = ScreenerConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("criteria"));
        assert!(json.contains("top_n"));

        let parsed: ScreenerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.criteria, config.criteria);
    }
}
