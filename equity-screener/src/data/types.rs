//! Core value types: price history, fundamentals, candidates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use screener_common::error::ResultExt;

use super::estimators::{EstimatorChain, FinancialSnapshot};

// ============================================================================
// Series Errors
// ============================================================================

/// Caller-contract violations detected while building a [`PriceSeries`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    /// The close/high/low sequences differ in length
    #[error("price series length mismatch: close={close}, high={high}, low={low}")]
    LengthMismatch { close: usize, high: usize, low: usize },

    /// A reading is zero, negative, NaN or infinite
    #[error("invalid {field} reading {value} at index {index}: prices must be positive and finite")]
    InvalidReading {
        field: &'static str,
        index: usize,
        value: f64,
    },
}

impl From<SeriesError> for screener_common::Error {
    fn from(err: SeriesError) -> Self {
        screener_common::Error::InvalidInput(err.to_string())
    }
}

// ============================================================================
// Price Series
// ============================================================================

/// Daily close/high/low history, oldest first.
///
/// Construction validates that the three sequences are aligned and strictly
/// positive, so every `PriceSeries` in existence satisfies that invariant.
/// Deserialization goes through the same check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceSeries", into = "RawPriceSeries")]
pub struct PriceSeries {
    close: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
}

/// Wire shape of a price series.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPriceSeries {
    close: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
}

impl TryFrom<RawPriceSeries> for PriceSeries {
    type Error = SeriesError;

    fn try_from(raw: RawPriceSeries) -> Result<Self, Self::Error> {
        PriceSeries::new(raw.close, raw.high, raw.low)
    }
}

impl From<PriceSeries> for RawPriceSeries {
    fn from(series: PriceSeries) -> Self {
        Self {
            close: series.close,
            high: series.high,
            low: series.low,
        }
    }
}

impl PriceSeries {
    /// Build a series from already-cleaned sequences.
    pub fn new(close: Vec<f64>, high: Vec<f64>, low: Vec<f64>) -> Result<Self, SeriesError> {
        if close.len() != high.len() || close.len() != low.len() {
            return Err(SeriesError::LengthMismatch {
                close: close.len(),
                high: high.len(),
                low: low.len(),
            });
        }

        for (field, values) in [("close", &close), ("high", &high), ("low", &low)] {
            if let Some((index, &value)) = values
                .iter()
                .enumerate()
                .find(|(_, v)| !is_valid_price(**v))
            {
                return Err(SeriesError::InvalidReading { field, index, value });
            }
        }

        Ok(Self { close, high, low })
    }

    /// Build a series from raw provider readings.
    ///
    /// A day is kept only when all three readings are present, positive and
    /// finite, so the cleaned sequences stay aligned day by day. Days past the
    /// end of the shortest input are ignored.
    pub fn from_raw(close: &[Option<f64>], high: &[Option<f64>], low: &[Option<f64>]) -> Self {
        let mut series = Self {
            close: Vec::with_capacity(close.len()),
            high: Vec::with_capacity(close.len()),
            low: Vec::with_capacity(close.len()),
        };

        for ((c, h), l) in close.iter().zip(high).zip(low) {
            if let (Some(c), Some(h), Some(l)) = (*c, *h, *l) {
                if is_valid_price(c) && is_valid_price(h) && is_valid_price(l) {
                    series.close.push(c);
                    series.high.push(h);
                    series.low.push(l);
                }
            }
        }

        series
    }

    /// Close prices, oldest first.
    pub fn close(&self) -> &[f64] {
        &self.close
    }

    /// High prices, oldest first.
    pub fn high(&self) -> &[f64] {
        &self.high
    }

    /// Low prices, oldest first.
    pub fn low(&self) -> &[f64] {
        &self.low
    }

    /// Number of trading days.
    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Most recent close, if any.
    pub fn latest_close(&self) -> Option<f64> {
        self.close.last().copied()
    }
}

fn is_valid_price(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

// ============================================================================
// Fundamentals
// ============================================================================

/// Fundamental metrics for one candidate. Percentages are in percent units
/// (15.0 means 15%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FundamentalMetrics {
    /// Return on equity (%)
    pub roe: f64,
    /// Revenue growth (%)
    pub revenue_growth: f64,
    /// Year-over-year growth (%)
    pub yoy_growth: f64,
    /// EPS growth (%)
    pub eps_growth: f64,
    /// Earnings per share (currency units)
    pub eps: f64,
    /// Debt ratio (%)
    pub debt_ratio: f64,
    /// Consecutive years with a dividend
    pub dividend_years: u32,
}

// ============================================================================
// Candidate
// ============================================================================

/// One equity submitted for screening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Ticker symbol (e.g., "2330")
    pub symbol: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Fundamentals supplied by the fetch layer
    pub metrics: FundamentalMetrics,
    /// Cleaned daily price history
    pub series: PriceSeries,
    /// Live quote; when absent the latest close is the current price
    #[serde(default)]
    pub quote: Option<f64>,
}

impl Candidate {
    pub fn new(symbol: impl Into<String>, metrics: FundamentalMetrics, series: PriceSeries) -> Self {
        Self {
            symbol: symbol.into(),
            name: String::new(),
            metrics,
            series,
            quote: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_quote(mut self, quote: f64) -> Self {
        self.quote = Some(quote);
        self
    }

    /// Name for display, falling back to the symbol.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.symbol
        } else {
            &self.name
        }
    }
}

// ============================================================================
// Candidate Records
// ============================================================================

/// Fundamentals as delivered by the fetch layer. ROE and debt ratio may be
/// absent; they are resolved through an [`EstimatorChain`] before ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedMetrics {
    #[serde(default)]
    pub roe: Option<f64>,
    pub revenue_growth: f64,
    pub yoy_growth: f64,
    pub eps_growth: f64,
    pub eps: f64,
    #[serde(default)]
    pub debt_ratio: Option<f64>,
    pub dividend_years: u32,
}

/// One entry of a candidates file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub metrics: ReportedMetrics,
    pub series: PriceSeries,
    #[serde(default)]
    pub quote: Option<f64>,
    /// Statement figures the estimators fall back on
    #[serde(default)]
    pub financials: FinancialSnapshot,
}

impl CandidateRecord {
    /// Fill missing ROE and debt ratio, producing a fully formed [`Candidate`].
    pub fn resolve(
        self,
        roe_chain: &EstimatorChain,
        debt_chain: &EstimatorChain,
    ) -> screener_common::Result<Candidate> {
        let roe = resolve_metric(self.metrics.roe, roe_chain, &self.financials, &self.symbol, "roe")?;
        let debt_ratio = resolve_metric(
            self.metrics.debt_ratio,
            debt_chain,
            &self.financials,
            &self.symbol,
            "debt_ratio",
        )?;

        let m = self.metrics;
        Ok(Candidate {
            symbol: self.symbol,
            name: self.name,
            metrics: FundamentalMetrics {
                roe,
                revenue_growth: m.revenue_growth,
                yoy_growth: m.yoy_growth,
                eps_growth: m.eps_growth,
                eps: m.eps,
                debt_ratio,
                dividend_years: m.dividend_years,
            },
            series: self.series,
            quote: self.quote,
        })
    }
}

fn resolve_metric(
    reported: Option<f64>,
    chain: &EstimatorChain,
    financials: &FinancialSnapshot,
    symbol: &str,
    metric: &'static str,
) -> screener_common::Result<f64> {
    if let Some(value) = reported {
        return Ok(value);
    }

    let estimate = chain
        .resolve(financials)
        .ok_or_else(|| {
            screener_common::Error::InvalidInput(format!("{metric} missing and not estimable"))
        })
        .context(format!("candidate {symbol}"))?;
    tracing::debug!(symbol, metric, value = estimate.value, source = %estimate.source, "Estimated metric");
    Ok(estimate.value)
}

/// Parse a JSON array of candidate records and resolve missing metrics with
/// the default estimator chains. Shape errors and contract violations
/// (e.g. a misaligned price series) map to `InvalidInput`.
pub fn parse_candidates(json: &str) -> screener_common::Result<Vec<Candidate>> {
    let records: Vec<CandidateRecord> = serde_json::from_str(json).map_err(|e| match e.classify() {
        serde_json::error::Category::Data => screener_common::Error::InvalidInput(e.to_string()),
        _ => screener_common::Error::Json(e),
    })?;

    let roe_chain = EstimatorChain::return_on_equity();
    let debt_chain = EstimatorChain::debt_ratio();
    records
        .into_iter()
        .map(|r| r.resolve(&roe_chain, &debt_chain))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = PriceSeries::new(vec![1.0, 2.0], vec![1.0], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            SeriesError::LengthMismatch {
                close: 2,
                high: 1,
                low: 2
            }
        );
    }

    #[test]
    fn test_new_rejects_non_positive() {
        let err = PriceSeries::new(vec![1.0, 2.0], vec![1.5, 2.5], vec![0.5, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            SeriesError::InvalidReading { field: "low", index: 1, .. }
        ));

        let err = PriceSeries::new(vec![f64::NAN], vec![1.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidReading { field: "close", .. }));
    }

    #[test]
    fn test_from_raw_drops_incomplete_days() {
        let close = [Some(10.0), None, Some(11.0), Some(-1.0), Some(12.0)];
        let high = [Some(10.5), Some(10.8), Some(11.5), Some(11.0), Some(12.5)];
        let low = [Some(9.5), Some(9.8), Some(0.0), Some(10.0), Some(11.5)];

        let series = PriceSeries::from_raw(&close, &high, &low);
        assert_eq!(series.close(), &[10.0, 12.0]);
        assert_eq!(series.high(), &[10.5, 12.5]);
        assert_eq!(series.low(), &[9.5, 11.5]);
        assert_eq!(series.latest_close(), Some(12.0));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: PriceSeries =
            serde_json::from_str(r#"{"close": [10.0], "high": [11.0], "low": [9.0]}"#).unwrap();
        assert_eq!(ok.len(), 1);

        let bad = serde_json::from_str::<PriceSeries>(
            r#"{"close": [10.0, 11.0], "high": [11.0], "low": [9.0]}"#,
        );
        assert!(bad.unwrap_err().to_string().contains("length mismatch"));
    }

    #[test]
    fn test_series_error_into_common_error() {
        let err: screener_common::Error = SeriesError::LengthMismatch {
            close: 1,
            high: 2,
            low: 3,
        }
        .into();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_parse_candidates() {
        let json = r#"[{
            "symbol": "2330",
            "metrics": {"roe": 20.0, "revenue_growth": 15.0, "yoy_growth": 25.0,
                        "eps_growth": 150.0, "eps": 3.0, "debt_ratio": 20.0, "dividend_years": 6},
            "series": {"close": [10.0, 11.0], "high": [10.5, 11.5], "low": [9.5, 10.5]},
            "quote": 11.2
        }]"#;
        let candidates = parse_candidates(json).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].quote, Some(11.2));
        assert_eq!(candidates[0].name, "");

        let misaligned = json.replace("[9.5, 10.5]", "[9.5]");
        assert!(parse_candidates(&misaligned).unwrap_err().is_invalid_input());

        let err = parse_candidates("[{").unwrap_err();
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_series_json_roundtrip_is_exact() {
        let close: Vec<f64> = (0..90).map(|i| 100.0 + f64::from(i) * 0.3 + 0.001 * f64::from(i % 7)).collect();
        let high: Vec<f64> = close.iter().map(|c| c * 1.01).collect();
        let low: Vec<f64> = close.iter().map(|c| c * 0.99).collect();
        let series = PriceSeries::new(close, high, low).unwrap();

        let json = serde_json::to_string(&series).unwrap();
        let parsed: PriceSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, series);
    }

    #[test]
    fn test_parse_candidates_estimates_missing_metrics() {
        let json = r#"[{
            "symbol": "2317",
            "metrics": {"revenue_growth": 5.0, "yoy_growth": 3.0, "eps_growth": 60.0,
                        "eps": 2.0, "dividend_years": 4},
            "series": {"close": [10.0], "high": [10.5], "low": [9.5]},
            "financials": {"pe_ratio": 12.0, "total_liabilities": 30.0, "total_assets": 120.0}
        }, {
            "symbol": "1101",
            "metrics": {"roe": 7.5, "revenue_growth": 5.0, "yoy_growth": 3.0, "eps_growth": 60.0,
                        "eps": 2.0, "dividend_years": 4},
            "series": {"close": [10.0], "high": [10.5], "low": [9.5]}
        }]"#;
        let candidates = parse_candidates(json).unwrap();

        // PE band (12 => 20%), balance sheet (30 / 120 => 25%)
        assert_eq!(candidates[0].metrics.roe, 20.0);
        assert_eq!(candidates[0].metrics.debt_ratio, 25.0);
        // reported ROE wins; no figures, so debt falls back to the fixed 50%
        assert_eq!(candidates[1].metrics.roe, 7.5);
        assert_eq!(candidates[1].metrics.debt_ratio, 50.0);
    }

    #[test]
    fn test_resolve_fails_without_estimator() {
        let record: CandidateRecord = serde_json::from_str(
            r#"{"symbol": "X", "metrics": {"revenue_growth": 0.0, "yoy_growth": 0.0,
                "eps_growth": 0.0, "eps": 1.0, "debt_ratio": 10.0, "dividend_years": 0},
                "series": {"close": [1.0], "high": [1.0], "low": [1.0]}}"#,
        )
        .unwrap();
        let err = record
            .resolve(&EstimatorChain::new(), &EstimatorChain::debt_ratio())
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().starts_with("candidate X: "));
    }

    #[test]
    fn test_candidate_display_name() {
        let metrics = FundamentalMetrics {
            roe: 10.0,
            revenue_growth: 0.0,
            yoy_growth: 0.0,
            eps_growth: 0.0,
            eps: 1.0,
            debt_ratio: 40.0,
            dividend_years: 0,
        };
        let series = PriceSeries::new(vec![1.0], vec![1.0], vec![1.0]).unwrap();
        let candidate = Candidate::new("2330", metrics, series);
        assert_eq!(candidate.display_name(), "2330");
        assert_eq!(candidate.with_name("TSMC").display_name(), "TSMC");
    }
}
