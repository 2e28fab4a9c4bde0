//! Three-stage evaluation of a candidate.
//!
//! 1. Health: hard exclusion on any violated cut point
//! 2. Quality: seven tiered fundamental checks, advisory
//! 3. Timing: three tiered technical checks, advisory
//!
//! Tiered checks are expressed as [`TierLadder`]s: ordered `(bound, tier, label)`
//! rungs tried top-down, the first matching rung wins.

use serde::{Deserialize, Serialize};

use super::config::ScreeningCriteria;
use crate::data::FundamentalMetrics;
use crate::indicators::TechnicalIndicators;

// ============================================================================
// Fixed Cut Points
// ============================================================================

/// Stage 1 fails when ROE is at or below this (%).
pub const HEALTH_MIN_ROE: f64 = 0.0;
/// Stage 1 fails when debt ratio is at or above this (%).
pub const HEALTH_MAX_DEBT_RATIO: f64 = 80.0;
/// Stage 1 fails when revenue growth is at or below this (%).
pub const HEALTH_MIN_REVENUE_GROWTH: f64 = -20.0;
/// Stage 1 fails when YoY growth is at or below this (%).
pub const HEALTH_MIN_YOY_GROWTH: f64 = -30.0;
/// Stage 1 fails when EPS growth is at or below this (%).
pub const HEALTH_MIN_EPS_GROWTH: f64 = -50.0;
/// Stage 1 fails when EPS is at or below this.
pub const HEALTH_MIN_EPS: f64 = 0.0;

/// Number of quality checks.
pub const QUALITY_CHECKS: usize = 7;
/// Minimum quality pass ratio.
pub const QUALITY_PASS_RATIO: f64 = 0.6;
/// Number of timing checks. Fixed even when the MA check is skipped.
pub const TIMING_CHECKS: usize = 3;
/// Minimum timing pass ratio.
pub const TIMING_PASS_RATIO: f64 = 0.5;

// ============================================================================
// Filter Stage
// ============================================================================

/// Stage identifier, also used to label funnel rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    /// All submitted candidates
    Input,
    /// Mandatory health checks
    Health,
    /// Quality scoring
    Quality,
    /// Technical timing
    Timing,
}

impl std::fmt::Display for FilterStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "Input"),
            Self::Health => write!(f, "Health"),
            Self::Quality => write!(f, "Quality"),
            Self::Timing => write!(f, "Timing"),
        }
    }
}

// ============================================================================
// Tier Ladders
// ============================================================================

/// Classification tier of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Excellent,
    Acceptable,
    Fail,
}

impl Tier {
    pub fn passes(self) -> bool {
        !matches!(self, Self::Fail)
    }
}

/// Matching condition of a rung.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// `value >= min`
    AtLeast(f64),
    /// `value <= max`
    AtMost(f64),
    /// `min <= value <= max`
    Between { min: f64, max: f64 },
    /// `min <= value < max`
    HalfOpen { min: f64, max: f64 },
}

impl Bound {
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Self::AtLeast(min) => value >= min,
            Self::AtMost(max) => value <= max,
            Self::Between { min, max } => (min..=max).contains(&value),
            Self::HalfOpen { min, max } => (min..max).contains(&value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Rung {
    bound: Bound,
    tier: Tier,
    label: &'static str,
}

/// Ordered classification rules for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct TierLadder {
    metric: &'static str,
    rungs: Vec<Rung>,
    fail_label: &'static str,
}

impl TierLadder {
    pub fn new(metric: &'static str, fail_label: &'static str) -> Self {
        Self {
            metric,
            rungs: Vec::new(),
            fail_label,
        }
    }

    pub fn rung(mut self, bound: Bound, tier: Tier, label: &'static str) -> Self {
        self.rungs.push(Rung { bound, tier, label });
        self
    }

    pub fn metric(&self) -> &'static str {
        self.metric
    }

    /// Classify `value` against the rungs, top-down.
    pub fn classify(&self, value: f64) -> CheckResult {
        let (tier, label) = self
            .rungs
            .iter()
            .find(|r| r.bound.contains(value))
            .map(|r| (r.tier, r.label))
            .unwrap_or((Tier::Fail, self.fail_label));

        CheckResult {
            metric: self.metric.to_string(),
            value,
            tier,
            label: label.to_string(),
        }
    }
}

/// Outcome of one tiered check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub metric: String,
    pub value: f64,
    pub tier: Tier,
    pub label: String,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.tier.passes()
    }

    fn reason(&self) -> String {
        format!("{} {:.2}: {}", self.metric, self.value, self.label)
    }
}

// ============================================================================
// Stage Outcomes
// ============================================================================

/// Outcome of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: FilterStage,
    pub passed: bool,
    pub pass_count: usize,
    pub total_checks: usize,
    /// Tiered checks (empty for the health stage)
    pub checks: Vec<CheckResult>,
    /// One entry per failed condition
    pub reasons: Vec<String>,
}

impl StageOutcome {
    pub fn ratio(&self) -> f64 {
        if self.total_checks == 0 {
            0.0
        } else {
            self.pass_count as f64 / self.total_checks as f64
        }
    }

    fn from_checks(
        stage: FilterStage,
        checks: Vec<CheckResult>,
        total_checks: usize,
        min_ratio: f64,
    ) -> Self {
        let pass_count = checks.iter().filter(|c| c.passed()).count();
        let reasons = checks
            .iter()
            .filter(|c| !c.passed())
            .map(CheckResult::reason)
            .collect();
        let passed = pass_count as f64 / total_checks as f64 >= min_ratio;

        Self {
            stage,
            passed,
            pass_count,
            total_checks,
            checks,
            reasons,
        }
    }
}

/// All three stage outcomes for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub health: StageOutcome,
    pub quality: StageOutcome,
    pub timing: StageOutcome,
}

impl StageReport {
    /// Membership in the ranked output depends on stage 1 only.
    pub fn included(&self) -> bool {
        self.health.passed
    }
}

// ============================================================================
// Stage Evaluator
// ============================================================================

type MetricFn = fn(&FundamentalMetrics) -> f64;

/// Number of health checks.
pub const HEALTH_CHECKS: usize = 6;

/// Every violated stage-1 cut point, described.
fn health_violations(m: &FundamentalMetrics) -> Vec<String> {
    let rules = [
        (
            m.roe <= HEALTH_MIN_ROE,
            format!("ROE {:.2}% <= {}%", m.roe, HEALTH_MIN_ROE),
        ),
        (
            m.debt_ratio >= HEALTH_MAX_DEBT_RATIO,
            format!("Debt ratio {:.2}% >= {}%", m.debt_ratio, HEALTH_MAX_DEBT_RATIO),
        ),
        (
            m.revenue_growth <= HEALTH_MIN_REVENUE_GROWTH,
            format!(
                "Revenue growth {:.2}% <= {}%",
                m.revenue_growth, HEALTH_MIN_REVENUE_GROWTH
            ),
        ),
        (
            m.yoy_growth <= HEALTH_MIN_YOY_GROWTH,
            format!("YoY growth {:.2}% <= {}%", m.yoy_growth, HEALTH_MIN_YOY_GROWTH),
        ),
        (
            m.eps_growth <= HEALTH_MIN_EPS_GROWTH,
            format!("EPS growth {:.2}% <= {}%", m.eps_growth, HEALTH_MIN_EPS_GROWTH),
        ),
        (
            m.eps <= HEALTH_MIN_EPS,
            format!("EPS {:.2} <= {}", m.eps, HEALTH_MIN_EPS),
        ),
    ];

    rules
        .into_iter()
        .filter_map(|(violated, reason)| violated.then_some(reason))
        .collect()
}

/// Applies the three stages with a fixed set of criteria.
pub struct StageEvaluator {
    quality: Vec<(TierLadder, MetricFn)>,
    trend: TierLadder,
    k_line: TierLadder,
    d_line: TierLadder,
}

impl StageEvaluator {
    pub fn new(criteria: &ScreeningCriteria) -> Self {
        Self {
            quality: quality_ladders(criteria),
            trend: trend_ladder(),
            k_line: oscillator_ladder("%K"),
            d_line: oscillator_ladder("%D"),
        }
    }

    pub fn evaluate(
        &self,
        metrics: &FundamentalMetrics,
        indicators: &TechnicalIndicators,
    ) -> StageReport {
        StageReport {
            health: self.health(metrics),
            quality: self.quality(metrics),
            timing: self.timing(indicators),
        }
    }

    /// Stage 1: passes iff no cut point is violated.
    pub fn health(&self, metrics: &FundamentalMetrics) -> StageOutcome {
        let reasons = health_violations(metrics);

        StageOutcome {
            stage: FilterStage::Health,
            passed: reasons.is_empty(),
            pass_count: HEALTH_CHECKS - reasons.len(),
            total_checks: HEALTH_CHECKS,
            checks: Vec::new(),
            reasons,
        }
    }

    /// Stage 2: passes iff at least 60% of the seven checks pass.
    pub fn quality(&self, metrics: &FundamentalMetrics) -> StageOutcome {
        let checks = self
            .quality
            .iter()
            .map(|(ladder, value)| ladder.classify(value(metrics)))
            .collect();

        StageOutcome::from_checks(FilterStage::Quality, checks, QUALITY_CHECKS, QUALITY_PASS_RATIO)
    }

    /// Stage 3: passes iff at least half of the three checks pass. The MA
    /// check is skipped when price or MA60 is not positive, but still counts
    /// toward the denominator.
    pub fn timing(&self, indicators: &TechnicalIndicators) -> StageOutcome {
        let mut checks = Vec::with_capacity(TIMING_CHECKS);
        if let Some(pct) = indicators.price_vs_ma_pct() {
            checks.push(self.trend.classify(pct));
        }
        checks.push(self.k_line.classify(indicators.k));
        checks.push(self.d_line.classify(indicators.d));

        StageOutcome::from_checks(FilterStage::Timing, checks, TIMING_CHECKS, TIMING_PASS_RATIO)
    }
}

/// Evaluate all three stages.
pub fn evaluate(
    metrics: &FundamentalMetrics,
    indicators: &TechnicalIndicators,
    criteria: &ScreeningCriteria,
) -> StageReport {
    StageEvaluator::new(criteria).evaluate(metrics, indicators)
}

fn check(ladder: TierLadder, value: MetricFn) -> (TierLadder, MetricFn) {
    (ladder, value)
}

fn quality_ladders(criteria: &ScreeningCriteria) -> Vec<(TierLadder, MetricFn)> {
    vec![
        check(
            TierLadder::new("ROE", "below 10%")
                .rung(Bound::AtLeast(15.0), Tier::Excellent, "excellent")
                .rung(Bound::AtLeast(10.0), Tier::Acceptable, "acceptable"),
            |m| m.roe,
        ),
        check(
            TierLadder::new("Revenue growth", "shrinking")
                .rung(Bound::AtLeast(10.0), Tier::Excellent, "excellent")
                .rung(Bound::AtLeast(0.0), Tier::Acceptable, "acceptable"),
            |m| m.revenue_growth,
        ),
        check(
            TierLadder::new("YoY growth", "shrinking")
                .rung(Bound::AtLeast(criteria.min_yoy_growth), Tier::Excellent, "excellent")
                .rung(Bound::AtLeast(0.0), Tier::Acceptable, "acceptable"),
            |m| m.yoy_growth,
        ),
        check(
            TierLadder::new("EPS growth", "below 50%")
                .rung(Bound::AtLeast(criteria.min_eps_growth), Tier::Excellent, "excellent")
                .rung(Bound::AtLeast(50.0), Tier::Acceptable, "acceptable"),
            |m| m.eps_growth,
        ),
        check(
            TierLadder::new("EPS", "below minimum")
                .rung(Bound::AtLeast(criteria.min_eps), Tier::Excellent, "meets minimum"),
            |m| m.eps,
        ),
        check(
            TierLadder::new("Debt ratio", "above 50%")
                .rung(Bound::AtMost(30.0), Tier::Excellent, "excellent")
                .rung(Bound::AtMost(50.0), Tier::Acceptable, "acceptable"),
            |m| m.debt_ratio,
        ),
        check(
            TierLadder::new("Dividend years", "fewer than 3")
                .rung(Bound::AtLeast(5.0), Tier::Excellent, "excellent")
                .rung(Bound::AtLeast(3.0), Tier::Acceptable, "acceptable"),
            |m| f64::from(m.dividend_years),
        ),
    ]
}

fn trend_ladder() -> TierLadder {
    TierLadder::new("Price vs MA60 %", "below MA60")
        .rung(Bound::AtLeast(5.0), Tier::Excellent, "strong")
        .rung(Bound::AtLeast(0.0), Tier::Acceptable, "holding")
}

fn oscillator_ladder(metric: &'static str) -> TierLadder {
    TierLadder::new(metric, "out of range")
        .rung(Bound::Between { min: 50.0, max: 80.0 }, Tier::Excellent, "buy zone")
        .rung(Bound::HalfOpen { min: 30.0, max: 90.0 }, Tier::Acceptable, "watch")
}

// ============================================================================
// Tests
// ============================================================================
