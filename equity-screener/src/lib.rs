//! Equity Screener Library
//!
//! Screens a universe of equities against fundamental and technical
//! thresholds and produces a ranked, scored shortlist.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     equity-screener                                 │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐      │
//! │  │  data           │  │  indicators     │  │  screener       │      │
//! │  │  series/metrics │─▶│  MA60, KD       │─▶│  stages, score  │      │
//! │  │  estimators     │  │  analytics      │  │  rank, report   │      │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Stages
//! - **Health**: hard exclusion; any violated cut point drops the candidate
//! - **Quality**: seven tiered checks, passes at 60%, advisory
//! - **Timing**: price vs MA60 and the KD lines, passes at 50%, advisory
//!
//! ## Score
//! - Capped fundamental terms plus flat technical bonuses
//! - Survivors sorted by score descending, ties in input order

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analytics;
pub mod config;
pub mod data;
pub mod indicators;
pub mod screener;

pub use config::Config;
pub use data::{Candidate, FundamentalMetrics, PriceSeries, SeriesError};
pub use indicators::TechnicalIndicators;
pub use screener::{rank, ScreenerEngine, ScreeningCriteria, Verdict};
