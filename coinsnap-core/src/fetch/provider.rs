//! Market-data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over the upstream source so the
//! merge and load stages can be exercised with a deterministic in-memory
//! provider in tests, without any network dependency.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One raw observation in a time series: epoch milliseconds plus a value.
///
/// Serialized as a two-element array `[timestamp_ms, value]`, the shape the
/// upstream market-chart endpoint uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, f64)", into = "(i64, f64)")]
pub struct SeriesPoint {
    pub timestamp_ms: i64,
    pub value: f64,
}

impl From<(i64, f64)> for SeriesPoint {
    fn from((timestamp_ms, value): (i64, f64)) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

impl From<SeriesPoint> for (i64, f64) {
    fn from(p: SeriesPoint) -> Self {
        (p.timestamp_ms, p.value)
    }
}

/// The three parallel series one fetch returns.
///
/// No alignment is guaranteed: each series may have a different length or a
/// different set of timestamps than the others. Absent keys deserialize as
/// empty series, matching upstream behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<SeriesPoint>,
    #[serde(default)]
    pub market_caps: Vec<SeriesPoint>,
    #[serde(default)]
    pub total_volumes: Vec<SeriesPoint>,
}

impl MarketChart {
    /// A run is meaningless without prices. Empty market caps or volumes are
    /// tolerated; only price emptiness aborts the run.
    pub fn require_prices(&self) -> Result<(), FetchError> {
        if self.prices.is_empty() {
            return Err(FetchError::NoDataReturned);
        }
        Ok(())
    }
}

/// Structured errors for the fetch stage.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, timeout, non-success status, or a malformed
    /// response body.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream responded successfully but the price series was empty.
    #[error("upstream returned no price data")]
    NoDataReturned,
}

/// Trait for market-data providers.
///
/// Implementations handle the specifics of one upstream source. The job
/// orchestration only sees this seam.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the three daily series for a currency over a trailing window.
    fn fetch(&self, currency: &str, lookback_days: u32) -> Result<MarketChart, FetchError>;
}
