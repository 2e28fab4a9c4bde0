//! Composite score.
//!
//! Fundamental terms carry up to 80 points and technical bonuses 30. Every
//! fundamental term is capped at its weight except debt ratio, which is
//! linear and goes negative above 100%.

use serde::{Deserialize, Serialize};

use crate::data::FundamentalMetrics;
use crate::indicators::TechnicalIndicators;

pub const ROE_WEIGHT: f64 = 15.0;
pub const REVENUE_GROWTH_WEIGHT: f64 = 10.0;
pub const YOY_GROWTH_WEIGHT: f64 = 15.0;
pub const EPS_GROWTH_WEIGHT: f64 = 20.0;
pub const EPS_WEIGHT: f64 = 5.0;
pub const DEBT_RATIO_WEIGHT: f64 = 10.0;
pub const DIVIDEND_WEIGHT: f64 = 5.0;
pub const ABOVE_MA_BONUS: f64 = 15.0;
pub const K_ZONE_BONUS: f64 = 8.0;
pub const D_ZONE_BONUS: f64 = 7.0;

/// Maximum attainable score (sum of all weights).
pub const MAX_SCORE: f64 = 110.0;

const ROE_FULL: f64 = 30.0;
const REVENUE_GROWTH_FULL: f64 = 20.0;
const YOY_GROWTH_FULL: f64 = 30.0;
const EPS_GROWTH_FULL: f64 = 200.0;
const EPS_FULL: f64 = 5.0;
const DIVIDEND_FULL: f64 = 10.0;

const GOLDEN_ZONE_LOW: f64 = 50.0;
const GOLDEN_ZONE_HIGH: f64 = 80.0;

/// Per-term contributions to the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub roe: f64,
    pub revenue_growth: f64,
    pub yoy_growth: f64,
    pub eps_growth: f64,
    pub eps: f64,
    pub debt_ratio: f64,
    pub dividend: f64,
    pub above_ma: f64,
    pub k_zone: f64,
    pub d_zone: f64,
}

impl ScoreBreakdown {
    pub fn compute(metrics: &FundamentalMetrics, indicators: &TechnicalIndicators) -> Self {
        let in_zone = |v: f64| (GOLDEN_ZONE_LOW..=GOLDEN_ZONE_HIGH).contains(&v);

        Self {
            roe: capped(metrics.roe, ROE_FULL, ROE_WEIGHT),
            revenue_growth: capped(metrics.revenue_growth, REVENUE_GROWTH_FULL, REVENUE_GROWTH_WEIGHT),
            yoy_growth: capped(metrics.yoy_growth, YOY_GROWTH_FULL, YOY_GROWTH_WEIGHT),
            eps_growth: capped(metrics.eps_growth, EPS_GROWTH_FULL, EPS_GROWTH_WEIGHT),
            eps: capped(metrics.eps, EPS_FULL, EPS_WEIGHT),
            debt_ratio: (1.0 - metrics.debt_ratio / 100.0) * DEBT_RATIO_WEIGHT,
            dividend: capped(f64::from(metrics.dividend_years), DIVIDEND_FULL, DIVIDEND_WEIGHT),
            above_ma: bonus(indicators.price > indicators.ma60, ABOVE_MA_BONUS),
            k_zone: bonus(in_zone(indicators.k), K_ZONE_BONUS),
            d_zone: bonus(in_zone(indicators.d), D_ZONE_BONUS),
        }
    }

    pub fn fundamental(&self) -> f64 {
        self.roe
            + self.revenue_growth
            + self.yoy_growth
            + self.eps_growth
            + self.eps
            + self.debt_ratio
            + self.dividend
    }

    pub fn technical(&self) -> f64 {
        self.above_ma + self.k_zone + self.d_zone
    }

    pub fn total(&self) -> f64 {
        self.fundamental() + self.technical()
    }
}

/// Composite score of a stage-1 survivor.
pub fn score(metrics: &FundamentalMetrics, indicators: &TechnicalIndicators) -> f64 {
    ScoreBreakdown::compute(metrics, indicators).total()
}

fn capped(value: f64, full: f64, weight: f64) -> f64 {
    (value / full).min(1.0) * weight
}

fn bonus(hit: bool, points: f64) -> f64 {
    if hit {
        points
    } else {
        0.0
    }
}
