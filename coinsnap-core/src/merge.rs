//! Outer-join merge of the three fetched series.
//!
//! Each series becomes a two-column keyed frame (`timestamp_ms` + value).
//! A full outer join on `timestamp_ms` keeps every timestamp present in any
//! input; series missing a timestamp contribute null for that row. The raw
//! millisecond key is then replaced by a `time` datetime column and the
//! result is sorted ascending.

use crate::fetch::{MarketChart, SeriesPoint};
use polars::prelude::*;
use thiserror::Error;

/// Errors while joining series.
///
/// These indicate an internal invariant violation, not a recoverable
/// condition: a valid fetch result always merges.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("dataframe operation failed: {0}")]
    Frame(#[from] PolarsError),
}

/// Merge the three series into the snapshot table.
///
/// Output columns, in order: `time` (Datetime[ms], UTC-derived),
/// `price_usd`, `market_cap_usd`, `volume_usd` (Float64, nullable).
/// Rows are sorted ascending by `time`.
pub fn merge_chart(chart: &MarketChart) -> Result<DataFrame, MergeError> {
    let prices = series_frame(&chart.prices, "price_usd")?;
    let caps = series_frame(&chart.market_caps, "market_cap_usd")?;
    let volumes = series_frame(&chart.total_volumes, "volume_usd")?;

    let args = JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns);

    let merged = prices
        .lazy()
        .join(
            caps.lazy(),
            [col("timestamp_ms")],
            [col("timestamp_ms")],
            args.clone(),
        )
        .join(
            volumes.lazy(),
            [col("timestamp_ms")],
            [col("timestamp_ms")],
            args,
        )
        .with_column(
            col("timestamp_ms")
                .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                .alias("time"),
        )
        .sort(["time"], SortMultipleOptions::default())
        .select([
            col("time"),
            col("price_usd"),
            col("market_cap_usd"),
            col("volume_usd"),
        ])
        .collect()?;

    Ok(merged)
}

/// Render the first `n` rows for observability. Correctness-neutral.
pub fn preview(df: &DataFrame, n: usize) -> String {
    format!("{}", df.head(Some(n)))
}

/// Convert one raw series into a keyed two-column frame.
fn series_frame(points: &[SeriesPoint], value_name: &str) -> Result<DataFrame, MergeError> {
    let timestamps: Vec<i64> = points.iter().map(|p| p.timestamp_ms).collect();
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();

    let df = DataFrame::new(vec![
        Column::new("timestamp_ms".into(), timestamps),
        Column::new(value_name.into(), values),
    ])?;
    Ok(df)
}
