//! Fallback estimators for fundamentals the providers do not report.
//!
//! Providers often omit ROE or debt ratio for a symbol. The fetch layer
//! resolves such a metric through an [`EstimatorChain`]: an ordered list of
//! strategies, each returning `Some` only when it can produce a value. The
//! first answer wins. The screening core only ever receives the resolved
//! number; it never learns which strategy supplied it.

use serde::{Deserialize, Serialize};

/// Raw statement figures available for a symbol. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    /// Latest net income
    #[serde(default)]
    pub net_income: Option<f64>,
    /// Equity attributable to shareholders
    #[serde(default)]
    pub shareholder_equity: Option<f64>,
    /// Price/earnings ratio
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    /// Total liabilities
    #[serde(default)]
    pub total_liabilities: Option<f64>,
    /// Total assets
    #[serde(default)]
    pub total_assets: Option<f64>,
}

/// A single estimation strategy.
pub trait Estimator: Send + Sync {
    /// Strategy name, recorded alongside the estimate.
    fn name(&self) -> &str;

    /// Produce a value, or `None` when the snapshot lacks what this strategy needs.
    fn estimate(&self, snapshot: &FinancialSnapshot) -> Option<f64>;
}

/// A resolved metric and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub value: f64,
    pub source: String,
}

/// ROE from net income over shareholder equity, in percent.
pub struct ReportedReturnOnEquity;

impl Estimator for ReportedReturnOnEquity {
    fn name(&self) -> &str {
        "reported_roe"
    }

    fn estimate(&self, snapshot: &FinancialSnapshot) -> Option<f64> {
        let net_income = snapshot.net_income?;
        let equity = snapshot.shareholder_equity?;
        if equity == 0.0 {
            return None;
        }
        Some(net_income / equity * 100.0)
    }
}

/// Coarse ROE guess from the PE band.
pub struct PeBandReturnOnEquity;

impl Estimator for PeBandReturnOnEquity {
    fn name(&self) -> &str {
        "pe_band_roe"
    }

    fn estimate(&self, snapshot: &FinancialSnapshot) -> Option<f64> {
        let pe = snapshot.pe_ratio?;
        let roe = if pe > 0.0 && pe < 15.0 {
            20.0
        } else if (15.0..25.0).contains(&pe) {
            15.0
        } else {
            10.0
        };
        Some(roe)
    }
}

/// Debt ratio from total liabilities over total assets, in percent.
pub struct BalanceSheetDebtRatio;

impl Estimator for BalanceSheetDebtRatio {
    fn name(&self) -> &str {
        "balance_sheet_debt_ratio"
    }

    fn estimate(&self, snapshot: &FinancialSnapshot) -> Option<f64> {
        let liabilities = snapshot.total_liabilities?;
        let assets = snapshot.total_assets?;
        if assets == 0.0 {
            return None;
        }
        Some(liabilities / assets * 100.0)
    }
}

/// Last-resort constant.
pub struct Fixed(pub f64);

impl Estimator for Fixed {
    fn name(&self) -> &str {
        "fixed_default"
    }

    fn estimate(&self, _snapshot: &FinancialSnapshot) -> Option<f64> {
        Some(self.0)
    }
}

/// Ordered list of estimators tried until one answers.
#[derive(Default)]
pub struct EstimatorChain {
    estimators: Vec<Box<dyn Estimator>>,
}

impl EstimatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy with the lowest priority so far.
    pub fn then(mut self, estimator: impl Estimator + 'static) -> Self {
        self.estimators.push(Box::new(estimator));
        self
    }

    /// Reported figures, then the PE band, then 10%.
    pub fn return_on_equity() -> Self {
        Self::new()
            .then(ReportedReturnOnEquity)
            .then(PeBandReturnOnEquity)
            .then(Fixed(10.0))
    }

    /// Balance sheet, then 50%.
    pub fn debt_ratio() -> Self {
        Self::new().then(BalanceSheetDebtRatio).then(Fixed(50.0))
    }

    /// Run the strategies in order and return the first estimate.
    pub fn resolve(&self, snapshot: &FinancialSnapshot) -> Option<Estimate> {
        self.estimators.iter().find_map(|estimator| {
            estimator.estimate(snapshot).map(|value| Estimate {
                value,
                source: estimator.name().to_string(),
            })
        })
    }

    /// Names of the strategies, in priority order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.estimators.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.estimators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_reported_roe_preferred() {
        let snapshot = FinancialSnapshot {
            net_income: Some(150.0),
            shareholder_equity: Some(1000.0),
            pe_ratio: Some(10.0),
            ..Default::default()
        };

        let estimate = EstimatorChain::return_on_equity().resolve(&snapshot).unwrap();
        assert!((estimate.value - 15.0).abs() < 1e-9);
        assert_eq!(estimate.source, "reported_roe");
    }

    #[test]
    fn test_zero_equity_falls_through_to_pe_band() {
        let snapshot = FinancialSnapshot {
            net_income: Some(150.0),
            shareholder_equity: Some(0.0),
            pe_ratio: Some(12.0),
            ..Default::default()
        };

        let estimate = EstimatorChain::return_on_equity().resolve(&snapshot).unwrap();
        assert_eq!(estimate.value, 20.0);
        assert_eq!(estimate.source, "pe_band_roe");
    }

    #[test_case(5.0, 20.0 ; "cheap")]
    #[test_case(15.0, 15.0 ; "lower edge of middle band")]
    #[test_case(24.9, 15.0 ; "middle band")]
    #[test_case(25.0, 10.0 ; "expensive")]
    #[test_case(-3.0, 10.0 ; "negative earnings")]
    fn test_pe_band(pe: f64, expected: f64) {
        let snapshot = FinancialSnapshot {
            pe_ratio: Some(pe),
            ..Default::default()
        };
        assert_eq!(PeBandReturnOnEquity.estimate(&snapshot), Some(expected));
    }

    #[test]
    fn test_empty_snapshot_uses_fixed_defaults() {
        let snapshot = FinancialSnapshot::default();

        let roe = EstimatorChain::return_on_equity().resolve(&snapshot).unwrap();
        assert_eq!(roe.value, 10.0);
        assert_eq!(roe.source, "fixed_default");

        let debt = EstimatorChain::debt_ratio().resolve(&snapshot).unwrap();
        assert_eq!(debt.value, 50.0);
    }

    #[test]
    fn test_debt_ratio_from_balance_sheet() {
        let snapshot = FinancialSnapshot {
            total_liabilities: Some(300.0),
            total_assets: Some(1200.0),
            ..Default::default()
        };
        let debt = EstimatorChain::debt_ratio().resolve(&snapshot).unwrap();
        assert!((debt.value - 25.0).abs() < 1e-9);
        assert_eq!(debt.source, "balance_sheet_debt_ratio");
    }

    #[test]
    fn test_empty_chain_resolves_nothing() {
        let chain = EstimatorChain::new();
        assert!(chain.is_empty());
        assert!(chain.resolve(&FinancialSnapshot::default()).is_none());
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(
            EstimatorChain::return_on_equity().strategy_names(),
            vec!["reported_roe", "pe_band_roe", "fixed_default"]
        );
    }
}
