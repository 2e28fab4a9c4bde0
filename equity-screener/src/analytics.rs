//! Risk statistics reported next to each verdict.
//!
//! These figures are informational. They never influence stage outcomes,
//! the composite score or the ranking order.

use statrs::statistics::Statistics;

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Simple daily returns `(p[i] - p[i-1]) / p[i-1]`.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect()
}

/// Annualized volatility: population standard deviation of daily returns × √252.
///
/// Returns 0 with fewer than two closes.
pub fn annualized_volatility(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }
    let returns = daily_returns(closes);
    returns.iter().population_std_dev() * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Sharpe ratio `(mean - risk_free_rate) / population std-dev` of `returns`.
///
/// Returns 0 for empty input or zero deviation.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let mean = returns.iter().mean();
    let std_dev = returns.iter().population_std_dev();

    if std_dev > 0.0 && std_dev.is_finite() {
        (mean - risk_free_rate) / std_dev
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_returns() {
        let returns = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-12);
        assert!((returns[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_volatility_needs_two_points() {
        assert_eq!(annualized_volatility(&[]), 0.0);
        assert_eq!(annualized_volatility(&[10.0]), 0.0);
    }

    #[test]
    fn test_constant_growth_has_zero_volatility() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        assert!(annualized_volatility(&closes) < 1e-9);
    }

    #[test]
    fn test_alternating_returns_volatility() {
        // returns +10%, -10% alternate: population std-dev 0.1
        let closes = [100.0, 110.0, 99.0, 108.9, 98.01];
        let vol = annualized_volatility(&closes);
        assert!((vol - 0.1 * 252.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_sharpe_ratio() {
        let returns = [0.02, 0.04];
        // mean 0.03, population std-dev 0.01
        assert!((sharpe_ratio(&returns, 0.01) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_sharpe_degenerate_inputs() {
        assert_eq!(sharpe_ratio(&[], 0.0), 0.0);
        assert_eq!(sharpe_ratio(&[0.01, 0.01, 0.01], 0.0), 0.0);
    }
}
