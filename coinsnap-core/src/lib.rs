//! coinsnap core — Bitcoin daily market snapshot ETL.
//!
//! One run fetches three daily time series (price, market cap, trading
//! volume) for a trailing lookback window, outer-joins them into a single
//! time-indexed table, and replaces the contents of a destination table in
//! an analytical warehouse with the result:
//! - Market-data provider trait + CoinGecko implementation
//! - Deterministic outer-join merge of the three series
//! - Fixed four-column output schema with enforcement on write
//! - Warehouse client trait with atomic replace-load semantics
//! - Job orchestration: fetch → merge → load, fail-fast

pub mod config;
pub mod fetch;
pub mod job;
pub mod merge;
pub mod schema;
pub mod warehouse;

pub use config::{ConfigError, JobConfig};
pub use fetch::{CoinGeckoProvider, FetchError, MarketChart, MarketDataProvider, SeriesPoint};
pub use job::{run_snapshot, JobError, JobState, RunReport};
pub use merge::{merge_chart, preview, MergeError};
pub use schema::{SchemaError, SnapshotSchema};
pub use warehouse::{Destination, ParquetWarehouse, Session, WarehouseClient, WarehouseError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types that cross the provider/warehouse seams are
    /// Send + Sync, so an external scheduler can drive runs from any thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<JobConfig>();
        require_sync::<JobConfig>();
        require_send::<MarketChart>();
        require_sync::<MarketChart>();
        require_send::<Destination>();
        require_sync::<Destination>();
        require_send::<RunReport>();
        require_sync::<RunReport>();
        require_send::<JobError>();
        require_sync::<JobError>();
    }
}
