//! Upstream market-data fetching.

pub mod coingecko;
pub mod provider;

pub use coingecko::CoinGeckoProvider;
pub use provider::{FetchError, MarketChart, MarketDataProvider, SeriesPoint};
