//! Screener engine module.
//!
//! [`rank`] is the pure ranking pipeline. [`ScreenerEngine`] wraps it in a
//! run envelope with timing, a stage funnel and logging of exclusions.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use screener_common::logging::{generate_run_id, short_id};

use super::config::{ScreenerConfig, ScreeningCriteria};
use super::scoring::ScoreBreakdown;
use super::stages::{FilterStage, StageEvaluator, StageOutcome, StageReport};
use crate::analytics;
use crate::data::{Candidate, FundamentalMetrics};
use crate::indicators::{self, TechnicalIndicators};

// ============================================================================
// Verdict
// ============================================================================

/// A candidate that survived stage 1, with its annotations and score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Ticker symbol
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Fundamentals the verdict was computed from
    pub metrics: FundamentalMetrics,
    /// Derived indicators
    pub indicators: TechnicalIndicators,
    /// Outcome of all three stages
    pub stages: StageReport,
    /// Composite score
    pub score: f64,
    /// Per-term score contributions
    pub breakdown: ScoreBreakdown,
    /// Annualized volatility of closes (informational)
    pub volatility: f64,
}

impl Verdict {
    pub fn health(&self) -> &StageOutcome {
        &self.stages.health
    }

    pub fn quality(&self) -> &StageOutcome {
        &self.stages.quality
    }

    pub fn timing(&self) -> &StageOutcome {
        &self.stages.timing
    }
}

/// A candidate dropped at stage 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exclusion {
    pub symbol: String,
    pub name: String,
    pub reasons: Vec<String>,
}

enum Evaluation {
    Ranked(Verdict),
    Excluded(Exclusion),
}

fn evaluate_candidate(candidate: &Candidate, evaluator: &StageEvaluator) -> Evaluation {
    let indicators = indicators::compute_with_quote(&candidate.series, candidate.quote);
    let stages = evaluator.evaluate(&candidate.metrics, &indicators);

    if !stages.included() {
        return Evaluation::Excluded(Exclusion {
            symbol: candidate.symbol.clone(),
            name: candidate.display_name().to_string(),
            reasons: stages.health.reasons,
        });
    }

    let breakdown = ScoreBreakdown::compute(&candidate.metrics, &indicators);
    Evaluation::Ranked(Verdict {
        symbol: candidate.symbol.clone(),
        name: candidate.display_name().to_string(),
        metrics: candidate.metrics,
        indicators,
        stages,
        score: breakdown.total(),
        breakdown,
        volatility: analytics::annualized_volatility(candidate.series.close()),
    })
}

fn evaluate_all(
    candidates: &[Candidate],
    criteria: &ScreeningCriteria,
    parallel: bool,
) -> Vec<Evaluation> {
    let evaluator = StageEvaluator::new(criteria);
    if parallel {
        // indexed collect keeps input order
        candidates
            .par_iter()
            .map(|c| evaluate_candidate(c, &evaluator))
            .collect()
    } else {
        candidates
            .iter()
            .map(|c| evaluate_candidate(c, &evaluator))
            .collect()
    }
}

/// Descending by score; stable, so ties keep input order.
fn sort_by_score(verdicts: &mut [Verdict]) {
    verdicts.sort_by(|a, b| b.score.total_cmp(&a.score));
}

fn split(evaluations: Vec<Evaluation>) -> (Vec<Verdict>, Vec<Exclusion>) {
    let mut verdicts = Vec::new();
    let mut excluded = Vec::new();
    for evaluation in evaluations {
        match evaluation {
            Evaluation::Ranked(v) => verdicts.push(v),
            Evaluation::Excluded(e) => excluded.push(e),
        }
    }
    sort_by_score(&mut verdicts);
    (verdicts, excluded)
}

// ============================================================================
// Ranking Pipeline
// ============================================================================

/// Rank candidates: stage-1 failures are dropped, survivors are scored and
/// sorted by score descending with ties in input order.
pub fn rank(candidates: &[Candidate], criteria: &ScreeningCriteria) -> Vec<Verdict> {
    split(evaluate_all(candidates, criteria, false)).0
}

/// Same result as [`rank`], with candidates evaluated on the rayon pool.
pub fn rank_parallel(candidates: &[Candidate], criteria: &ScreeningCriteria) -> Vec<Verdict> {
    split(evaluate_all(candidates, criteria, true)).0
}

// ============================================================================
// Filter Result
// ============================================================================

/// Funnel row for one stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResult {
    /// Stage name
    pub stage: FilterStage,
    /// Number of candidates that passed this stage
    pub passed: usize,
    /// Number of candidates that did not pass
    pub eliminated: usize,
    /// Elimination rate (%)
    pub elimination_rate: f64,
}

impl FilterResult {
    pub fn new(stage: FilterStage, input_count: usize, passed_count: usize) -> Self {
        let eliminated = input_count.saturating_sub(passed_count);
        let elimination_rate = if input_count > 0 {
            (eliminated as f64 / input_count as f64) * 100.0
        } else {
            0.0
        };

        Self {
            stage,
            passed: passed_count,
            eliminated,
            elimination_rate,
        }
    }
}

// ============================================================================
// Screener Result
// ============================================================================

/// Result of a screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerResult {
    /// Run ID
    pub id: String,
    /// Stage-1 survivors, sorted by score descending
    pub verdicts: Vec<Verdict>,
    /// Candidates dropped at stage 1, in input order
    pub excluded: Vec<Exclusion>,
    /// Funnel rows; quality and timing are counted over survivors
    pub funnel: Vec<FilterResult>,
    /// Total candidates submitted
    pub total_scanned: usize,
    /// Criteria used
    pub criteria: ScreeningCriteria,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub completed_at: DateTime<Utc>,
    /// Duration in seconds
    pub duration_secs: f64,
}

impl ScreenerResult {
    /// Get the top N verdicts by score.
    pub fn top(&self, n: usize) -> Vec<&Verdict> {
        self.verdicts.iter().take(n).collect()
    }

    /// Summary string for logging.
    pub fn summary(&self) -> String {
        format!(
            "Screened {} candidates in {:.3}s: {} ranked ({:.1}%), {} excluded",
            self.total_scanned,
            self.duration_secs,
            self.verdicts.len(),
            if self.total_scanned > 0 {
                (self.verdicts.len() as f64 / self.total_scanned as f64) * 100.0
            } else {
                0.0
            },
            self.excluded.len()
        )
    }
}

// ============================================================================
// Screener Engine
// ============================================================================

/// Runs the ranking pipeline with the configured criteria.
pub struct ScreenerEngine {
    config: ScreenerConfig,
}

impl ScreenerEngine {
    pub fn new(config: ScreenerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Screen and rank `candidates`.
    pub fn run(&self, candidates: &[Candidate]) -> ScreenerResult {
        let started_at = Utc::now();
        let id = generate_run_id();
        let span = info_span!("screening", run_id = %short_id(&id));
        let _guard = span.enter();

        info!(
            candidates = candidates.len(),
            parallel = self.config.parallel,
            criteria = %self.config.criteria.summary(),
            "Starting screening run"
        );

        let evaluations = evaluate_all(candidates, &self.config.criteria, self.config.parallel);
        let (verdicts, excluded) = split(evaluations);

        for exclusion in &excluded {
            info!(
                symbol = %exclusion.symbol,
                reasons = %exclusion.reasons.join("; "),
                "Excluded at health stage"
            );
        }
        for verdict in &verdicts {
            debug!(
                symbol = %verdict.symbol,
                price = verdict.indicators.price,
                ma60 = verdict.indicators.ma60,
                k = verdict.indicators.k,
                d = verdict.indicators.d,
                score = verdict.score,
                "Scored candidate"
            );
        }

        let total = candidates.len();
        let survivors = verdicts.len();
        let funnel = vec![
            FilterResult::new(FilterStage::Input, total, total),
            FilterResult::new(FilterStage::Health, total, survivors),
            FilterResult::new(
                FilterStage::Quality,
                survivors,
                verdicts.iter().filter(|v| v.quality().passed).count(),
            ),
            FilterResult::new(
                FilterStage::Timing,
                survivors,
                verdicts.iter().filter(|v| v.timing().passed).count(),
            ),
        ];

        let completed_at = Utc::now();
        let duration_secs = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let result = ScreenerResult {
            id,
            verdicts,
            excluded,
            funnel,
            total_scanned: total,
            criteria: self.config.criteria,
            started_at,
            completed_at,
            duration_secs,
        };

        info!(summary = %result.summary(), "Screening run complete");
        result
    }
}

// ============================================================================
// Tests
// ============================================================================
