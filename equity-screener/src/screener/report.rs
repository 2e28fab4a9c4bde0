//! Report generation module for screener results.
//!
//! Generates reports in various formats:
//! - Markdown (for documentation)
//! - JSON (for programmatic use)
//! - Plain text (for terminals)

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::engine::{ScreenerResult, Verdict};
use super::stages::StageOutcome;

// ============================================================================
// Report Format
// ============================================================================

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Markdown format (human-readable)
    Markdown,
    /// JSON format (machine-readable)
    Json,
    /// Plain text (terminal)
    Text,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

// ============================================================================
// Screener Report
// ============================================================================

/// Report generator for screener results.
pub struct ScreenerReport {
    result: ScreenerResult,
    top_n: usize,
}

impl ScreenerReport {
    /// Create a report whose shortlist holds up to `top_n` picks.
    pub fn new(result: ScreenerResult, top_n: usize) -> Self {
        Self { result, top_n }
    }

    /// Generate report in the specified format.
    pub fn generate(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Markdown => self.to_markdown(),
            ReportFormat::Json => self.to_json(),
            ReportFormat::Text => self.to_text(),
        }
    }

    /// `screening_results_YYYYMMDD_HHMMSS.<ext>`, stamped with the run's completion time.
    pub fn file_name(&self, format: ReportFormat) -> String {
        format!(
            "screening_results_{}.{}",
            self.result.completed_at.format("%Y%m%d_%H%M%S"),
            format.extension()
        )
    }

    /// Save report into `dir`, creating it if needed.
    pub fn save_to_dir(&self, dir: &Path, format: ReportFormat) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

        let file_path = dir.join(self.file_name(format));
        std::fs::write(&file_path, self.generate(format))
            .with_context(|| format!("Failed to write report file {}", file_path.display()))?;

        Ok(file_path)
    }

    /// Generate markdown report.
    pub fn to_markdown(&self) -> String {
        let r = &self.result;
        let mut md = String::new();

        let _ = write!(
            md,
            "# Screening Report\n\n**Run ID**: {}\n**Time**: {}\n**Duration**: {:.3}s\n\n",
            r.id,
            r.completed_at.format("%Y-%m-%d %H:%M:%S"),
            r.duration_secs
        );

        md.push_str("## Summary\n\n");
        let _ = writeln!(md, "- **Scanned**: {}", r.total_scanned);
        let _ = writeln!(md, "- **Ranked**: {}", r.verdicts.len());
        let _ = writeln!(md, "- **Excluded**: {}", r.excluded.len());
        let _ = writeln!(md, "- **Criteria**: {}\n", r.criteria.summary());

        md.push_str("### Funnel\n\n");
        md.push_str("| Stage | Passed | Eliminated | Rate |\n");
        md.push_str("|-------|--------|------------|------|\n");
        for fr in &r.funnel {
            let _ = writeln!(
                md,
                "| {} | {} | {} | {:.1}% |",
                fr.stage, fr.passed, fr.eliminated, fr.elimination_rate
            );
        }
        md.push('\n');

        md.push_str("## Ranking\n\n");
        if r.verdicts.is_empty() {
            md.push_str("_No candidates passed the health stage._\n\n");
        } else {
            md.push_str(
                "| # | Symbol | Name | Score | ROE | Rev G | YoY | EPS G | EPS | Debt | Div | Price | MA60 | K | D | Q | T |\n",
            );
            md.push_str(
                "|---|--------|------|-------|-----|-------|-----|-------|-----|------|-----|-------|------|---|---|---|---|\n",
            );
            for (i, v) in r.verdicts.iter().enumerate() {
                let m = &v.metrics;
                let t = &v.indicators;
                let _ = writeln!(
                    md,
                    "| {} | {} | {} | {:.1} | {:.1}% | {:.1}% | {:.1}% | {:.1}% | {:.2} | {:.1}% | {} | {:.2} | {:.2} | {:.1} | {:.1} | {} | {} |",
                    i + 1,
                    v.symbol,
                    v.name,
                    v.score,
                    m.roe,
                    m.revenue_growth,
                    m.yoy_growth,
                    m.eps_growth,
                    m.eps,
                    m.debt_ratio,
                    m.dividend_years,
                    t.price,
                    t.ma60,
                    t.k,
                    t.d,
                    stage_mark(v.quality()),
                    stage_mark(v.timing()),
                );
            }
            md.push('\n');

            md.push_str("### Advisory Notes\n\n");
            for v in r.verdicts.iter().filter(|v| has_notes(v)) {
                let _ = writeln!(md, "- **{}**", v.symbol);
                for reason in v.quality().reasons.iter().chain(&v.timing().reasons) {
                    let _ = writeln!(md, "  - {}", reason);
                }
            }
            md.push('\n');
        }

        if !r.excluded.is_empty() {
            md.push_str("## Excluded\n\n");
            for e in &r.excluded {
                let _ = writeln!(md, "- **{}** {}: {}", e.symbol, e.name, e.reasons.join("; "));
            }
            md.push('\n');
        }

        md.push_str("## Top Picks\n\n");
        md.push_str(&self.top_picks());

        md
    }

    /// Generate JSON report.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Generate plain-text report.
    pub fn to_text(&self) -> String {
        let r = &self.result;
        let mut out = String::new();

        out.push_str("========== Screening Report ==========\n");
        let _ = writeln!(out, "Time: {}", r.completed_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "Criteria: {}", r.criteria.summary());
        let _ = writeln!(
            out,
            "Scanned {} -> ranked {} ({} excluded)\n",
            r.total_scanned,
            r.verdicts.len(),
            r.excluded.len()
        );

        for (i, v) in r.verdicts.iter().enumerate() {
            let m = &v.metrics;
            let t = &v.indicators;
            let _ = writeln!(out, "{}. {} ({})", i + 1, v.name, v.symbol);
            let _ = writeln!(
                out,
                "   Score: {:.1}  (fundamental {:.1} / technical {:.1})",
                v.score,
                v.breakdown.fundamental(),
                v.breakdown.technical()
            );
            let _ = writeln!(
                out,
                "   ROE: {:.1}%  Revenue growth: {:.1}%  YoY: {:.1}%  EPS growth: {:.1}%",
                m.roe, m.revenue_growth, m.yoy_growth, m.eps_growth
            );
            let _ = writeln!(
                out,
                "   EPS: {:.2}  Debt ratio: {:.1}%  Dividend years: {}",
                m.eps, m.debt_ratio, m.dividend_years
            );
            let _ = writeln!(
                out,
                "   Price: {:.2} | MA60: {:.2} | K: {:.1} | D: {:.1} | Volatility: {:.1}%",
                t.price,
                t.ma60,
                t.k,
                t.d,
                v.volatility * 100.0
            );
            let _ = writeln!(
                out,
                "   Quality: {}  Timing: {}",
                stage_summary(v.quality()),
                stage_summary(v.timing())
            );
            for reason in v.quality().reasons.iter().chain(&v.timing().reasons) {
                let _ = writeln!(out, "     - {}", reason);
            }
            out.push_str("   ---\n");
        }

        out.push_str("\nTop picks:\n");
        out.push_str(&self.top_picks());
        out
    }

    fn top_picks(&self) -> String {
        let picks = self.result.top(self.top_n);
        if picks.is_empty() {
            return "No candidates to recommend.\n".to_string();
        }

        picks
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{}. {} ({}) score {:.1}\n", i + 1, v.name, v.symbol, v.score))
            .collect()
    }

    /// Get the underlying result.
    pub fn result(&self) -> &ScreenerResult {
        &self.result
    }
}

fn stage_mark(outcome: &StageOutcome) -> &'static str {
    if outcome.passed {
        "✓"
    } else {
        "✗"
    }
}

fn stage_summary(outcome: &StageOutcome) -> String {
    format!(
        "{} {}/{}",
        if outcome.passed { "pass" } else { "fail" },
        outcome.pass_count,
        outcome.total_checks
    )
}

fn has_notes(v: &Verdict) -> bool {
    !v.quality().reasons.is_empty() || !v.timing().reasons.is_empty()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Candidate, FundamentalMetrics, PriceSeries};
    use crate::screener::config::ScreenerConfig;
    use crate::screener::engine::ScreenerEngine;

    fn create_test_result(roes: &[f64]) -> ScreenerResult {
        let close: Vec<f64> = (0..80).map(|i| 50.0 + i as f64).collect();
        let high: Vec<f64> = close.iter().map(|c| c + 2.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 2.0).collect();
        let series = PriceSeries::new(close, high, low).unwrap();

        let candidates: Vec<Candidate> = roes
            .iter()
            .enumerate()
            .map(|(i, &roe)| {
                let metrics = FundamentalMetrics {
                    roe,
                    revenue_growth: 12.0,
                    yoy_growth: 5.0,
                    eps_growth: 60.0,
                    eps: 2.0,
                    debt_ratio: 40.0,
                    dividend_years: 4,
                };
                Candidate::new(format!("{}", 2330 + i), metrics, series.clone())
                    .with_name(format!("Company {}", i))
            })
            .collect();

        ScreenerEngine::new(ScreenerConfig::default()).run(&candidates)
    }

    #[test]
    fn test_markdown_generation() {
        let report = ScreenerReport::new(create_test_result(&[20.0, 0.0, 11.0]), 3);
        let md = report.to_markdown();

        assert!(md.contains("# Screening Report"));
        assert!(md.contains("2330"));
        assert!(md.contains("Company 0"));
        assert!(md.contains("### Funnel"));
        assert!(md.contains("## Excluded"));
        assert!(md.contains("## Top Picks"));
    }

    #[test]
    fn test_json_generation() {
        let report = ScreenerReport::new(create_test_result(&[20.0]), 3);
        let json = report.to_json();

        assert!(json.contains("\"id\""));
        assert!(json.contains("\"verdicts\""));
        assert!(json.contains("\"breakdown\""));

        let parsed: ScreenerResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.verdicts.len(), 1);
    }

    #[test]
    fn test_text_top_picks_limited() {
        let report = ScreenerReport::new(create_test_result(&[20.0, 18.0, 16.0, 14.0, 12.0]), 3);
        let text = report.to_text();
        let picks = text.split("Top picks:").nth(1).unwrap();

        assert_eq!(picks.lines().filter(|l| !l.trim().is_empty()).count(), 3);
        assert!(picks.contains("Company 0"));
        assert!(!picks.contains("Company 3"));
    }

    #[test]
    fn test_empty_result_notes() {
        let report = ScreenerReport::new(create_test_result(&[0.0]), 3);
        assert!(report.to_text().contains("No candidates to recommend."));
        assert!(report.to_markdown().contains("No candidates passed the health stage."));
    }

    #[test]
    fn test_save_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let report = ScreenerReport::new(create_test_result(&[20.0]), 3);
        let target = dir.path().join("reports");

        let path = report.save_to_dir(&target, ReportFormat::Json).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("screening_results_"));
        assert!(name.ends_with(".json"));
        assert_eq!(name.len(), "screening_results_YYYYMMDD_HHMMSS.json".len());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"verdicts\""));
    }

    #[test]
    fn test_report_format_parsing() {
        assert_eq!("markdown".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("TXT".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert!("pdf".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Text.to_string(), "text");
    }
}
