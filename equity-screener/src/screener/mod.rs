//! Screening and ranking.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Ranking Pipeline                             │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  ┌─────────────┐     ┌─────────────┐     ┌─────────────┐            │
//! │  │ PriceSeries │────▶│ Indicators  │────▶│   Stages    │            │
//! │  │             │     │ MA60 / KD   │     │ 1 / 2 / 3   │            │
//! │  └─────────────┘     └─────────────┘     └──────┬──────┘            │
//! │                                                 │ stage 1 passed    │
//! │                      ┌─────────────┐     ┌──────▼──────┐            │
//! │                      │   Report    │◀────│   Scoring   │            │
//! │                      │ md/json/txt │     │  + sort     │            │
//! │                      └─────────────┘     └─────────────┘            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use equity_screener::screener::{ScreenerConfig, ScreenerEngine, ScreenerReport, ReportFormat};
//!
//! let config = ScreenerConfig::default();
//! let top_n = config.top_n;
//! let result = ScreenerEngine::new(config).run(&candidates);
//! println!("{}", ScreenerReport::new(result, top_n).generate(ReportFormat::Text));
//! ```

pub mod config;
pub mod engine;
pub mod report;
pub mod scoring;
pub mod stages;

pub use config::{OutputConfig, ScreenerConfig, ScreeningCriteria};
pub use engine::{
    rank, rank_parallel, Exclusion, FilterResult, ScreenerEngine, ScreenerResult, Verdict,
};
pub use report::{ReportFormat, ScreenerReport};
pub use scoring::{score, ScoreBreakdown};
pub use stages::{
    evaluate, Bound, CheckResult, FilterStage, StageEvaluator, StageOutcome, StageReport, Tier,
    TierLadder,
};
