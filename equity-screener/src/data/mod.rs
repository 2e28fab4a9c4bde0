//! Input records for the screener.
//!
//! The screening core consumes two typed inputs per candidate, a
//! [`FundamentalMetrics`] record and a [`PriceSeries`], bundled as a
//! [`Candidate`]. Fetching and parsing provider responses happens upstream;
//! [`estimators`] models the default-value policy that layer applies when a
//! metric is missing from a provider.

pub mod estimators;
mod types;

pub use estimators::{Estimate, Estimator, EstimatorChain, FinancialSnapshot};
pub use types::{
    parse_candidates, Candidate, CandidateRecord, FundamentalMetrics, PriceSeries, ReportedMetrics,
    SeriesError,
};
