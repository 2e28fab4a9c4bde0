//! Technical indicators derived from a price series.
//!
//! - **MA60**: arithmetic mean of the most recent 60 closes, or 0 when the
//!   series is shorter than that.
//! - **KD (stochastic oscillator)**: a raw stochastic value (RSV) over each
//!   trailing 9-day window, smoothed by a one-pole filter with constant 1/3:
//!
//! ```text
//! RSV_n = 100 * (close_n - lowest_low) / (highest_high - lowest_low)
//! K_n   = 2/3 * K_{n-1} + 1/3 * RSV_n
//! D_n   = 2/3 * D_{n-1} + 1/3 * K_n        (K_0 = D_0 = 50)
//! ```
//!
//! A zero-range window gives RSV = 50. Fewer than 9 days gives K = D = 50.

use serde::{Deserialize, Serialize};

use crate::data::PriceSeries;

/// Moving average window (trading days).
pub const MA_PERIOD: usize = 60;
/// Stochastic window (trading days).
pub const KD_PERIOD: usize = 9;
/// Seed and neutral value of both oscillator lines.
pub const KD_NEUTRAL: f64 = 50.0;

/// Smoothing divisor: each step moves 1/3 of the way toward the new value.
const KD_SMOOTHING: f64 = 3.0;

/// Indicators derived for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    /// 60-day moving average of close (0 = not computable)
    pub ma60: f64,
    /// Stochastic %K, in [0, 100]
    pub k: f64,
    /// Stochastic %D, in [0, 100]
    pub d: f64,
    /// Current price
    pub price: f64,
}

impl TechnicalIndicators {
    /// Percentage distance of price above MA60. `None` unless both are positive.
    pub fn price_vs_ma_pct(&self) -> Option<f64> {
        if self.price > 0.0 && self.ma60 > 0.0 {
            Some((self.price - self.ma60) / self.ma60 * 100.0)
        } else {
            None
        }
    }
}

/// Smoothed oscillator pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KdPair {
    pub k: f64,
    pub d: f64,
}

impl KdPair {
    pub const NEUTRAL: KdPair = KdPair {
        k: KD_NEUTRAL,
        d: KD_NEUTRAL,
    };
}

/// Derive indicators, taking the latest close as the current price.
pub fn compute(series: &PriceSeries) -> TechnicalIndicators {
    compute_with_quote(series, None)
}

/// Derive indicators; `quote` overrides the latest close as the current price.
pub fn compute_with_quote(series: &PriceSeries, quote: Option<f64>) -> TechnicalIndicators {
    let kd = stochastic(series);
    TechnicalIndicators {
        ma60: moving_average(series.close(), MA_PERIOD),
        k: kd.k,
        d: kd.d,
        price: quote.or_else(|| series.latest_close()).unwrap_or(0.0),
    }
}

/// Mean of the trailing `period` values; 0 when there are fewer values than that.
pub fn moving_average(values: &[f64], period: usize) -> f64 {
    if period == 0 || values.len() < period {
        return 0.0;
    }
    let window = &values[values.len() - period..];
    window.iter().sum::<f64>() / period as f64
}

/// Raw stochastic value of `close` within `[lowest, highest]`.
pub fn rsv(close: f64, highest: f64, lowest: f64) -> f64 {
    if highest == lowest {
        return KD_NEUTRAL;
    }
    (close - lowest) / (highest - lowest) * 100.0
}

/// RSV for every day that closes a full `period`-day window, oldest first.
pub fn rsv_series(close: &[f64], high: &[f64], low: &[f64], period: usize) -> Vec<f64> {
    let len = close.len().min(high.len()).min(low.len());
    if period == 0 || len < period {
        return Vec::new();
    }

    (period - 1..len)
        .map(|i| {
            let start = i + 1 - period;
            let highest = high[start..=i]
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            let lowest = low[start..=i].iter().copied().fold(f64::INFINITY, f64::min);
            rsv(close[i], highest, lowest)
        })
        .collect()
}

/// Apply the K/D recursion over `rsvs` in order, from the neutral seed.
///
/// `2/3 * prev + 1/3 * x` is evaluated as `prev + (x - prev) / 3` so that a
/// value equal to `prev` leaves it bit-for-bit unchanged.
pub fn smooth_kd(rsvs: &[f64]) -> KdPair {
    rsvs.iter().fold(KdPair::NEUTRAL, |prev, &rsv| {
        let k = prev.k + (rsv - prev.k) / KD_SMOOTHING;
        let d = prev.d + (k - prev.d) / KD_SMOOTHING;
        KdPair { k, d }
    })
}

/// Final %K/%D for a series.
pub fn stochastic(series: &PriceSeries) -> KdPair {
    if series.len() < KD_PERIOD {
        return KdPair::NEUTRAL;
    }
    let rsvs = rsv_series(series.close(), series.high(), series.low(), KD_PERIOD);
    smooth_kd(&rsvs)
}

// ============================================================================
// Tests
// ============================================================================
