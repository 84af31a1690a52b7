//! CoinGecko market-data provider.
//!
//! Fetches the daily price, market cap, and total volume series from the
//! public `/coins/bitcoin/market_chart` endpoint in one request. The request
//! is bounded by a 60 second timeout; a timeout is reported the same way as
//! any other transport failure.

use super::provider::{FetchError, MarketChart, MarketDataProvider};
use std::time::Duration;

/// CoinGecko public API provider.
pub struct CoinGeckoProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// Public API host. Override with [`with_base_url`] for tests.
    ///
    /// [`with_base_url`]: CoinGeckoProvider::with_base_url
    pub const DEFAULT_BASE_URL: &'static str = "https://api.coingecko.com";

    /// Upper bound on the one outbound call per run.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    /// Build a provider against an alternate host (mock server in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn chart_url(&self) -> String {
        format!("{}/api/v3/coins/bitcoin/market_chart", self.base_url)
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn fetch(&self, currency: &str, lookback_days: u32) -> Result<MarketChart, FetchError> {
        let days = lookback_days.to_string();
        let resp = self
            .client
            .get(self.chart_url())
            .query(&[
                ("vs_currency", currency),
                ("days", days.as_str()),
                ("interval", "daily"),
            ])
            .send()
            .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamUnavailable(format!("HTTP {status}")));
        }

        // An unexpected body shape is a transport-layer failure; there is no
        // recovery path for a half-parsed chart.
        let chart: MarketChart = resp
            .json()
            .map_err(|e| FetchError::UpstreamUnavailable(format!("malformed response: {e}")))?;

        chart.require_prices()?;
        Ok(chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn fetches_and_parses_chart() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v3/coins/bitcoin/market_chart")
                .query_param("vs_currency", "usd")
                .query_param("days", "180")
                .query_param("interval", "daily");
            then.status(200).json_body(json!({
                "prices": [[1_700_000_000_000i64, 100.0], [1_700_086_400_000i64, 110.0]],
                "market_caps": [[1_700_000_000_000i64, 2000.0]],
                "total_volumes": [[1_700_086_400_000i64, 50.0]]
            }));
        });

        let provider = CoinGeckoProvider::with_base_url(server.base_url());
        let chart = provider.fetch("usd", 180).unwrap();

        mock.assert();
        assert_eq!(chart.prices.len(), 2);
        assert_eq!(chart.market_caps.len(), 1);
        assert_eq!(chart.total_volumes.len(), 1);
    }

    #[test]
    fn non_success_status_is_upstream_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v3/coins/bitcoin/market_chart");
            then.status(503);
        });

        let provider = CoinGeckoProvider::with_base_url(server.base_url());
        let result = provider.fetch("usd", 180);

        assert!(matches!(result, Err(FetchError::UpstreamUnavailable(_))));
    }

    #[test]
    fn malformed_body_is_upstream_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v3/coins/bitcoin/market_chart");
            then.status(200).body("not json");
        });

        let provider = CoinGeckoProvider::with_base_url(server.base_url());
        let result = provider.fetch("usd", 180);

        assert!(matches!(result, Err(FetchError::UpstreamUnavailable(_))));
    }

    #[test]
    fn empty_price_series_is_no_data() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v3/coins/bitcoin/market_chart");
            then.status(200).json_body(json!({
                "prices": [],
                "market_caps": [[1i64, 2.0]],
                "total_volumes": [[1i64, 3.0]]
            }));
        });

        let provider = CoinGeckoProvider::with_base_url(server.base_url());
        let result = provider.fetch("usd", 180);

        assert!(matches!(result, Err(FetchError::NoDataReturned)));
    }
}
