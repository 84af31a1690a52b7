//! Job orchestration — wires fetch, merge, and load into one run.
//!
//! A run moves through `Pending → Fetching → Merging → Loading → Succeeded`;
//! any failure is terminal and surfaces the stage it occurred at. There is
//! no internal retry: retry and alerting policy belong to whatever schedules
//! the job. Stages never run out of order and nothing is written on a
//! failed run.

use crate::config::JobConfig;
use crate::fetch::{FetchError, MarketDataProvider};
use crate::merge::{self, MergeError};
use crate::warehouse::{WarehouseClient, WarehouseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of leading rows rendered into the run report.
pub const PREVIEW_ROWS: usize = 5;

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Fetching,
    Merging,
    Loading,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// Errors from a run, one variant per stage.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("fetch failed: {0}")]
    Upstream(#[from] FetchError),

    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("warehouse write failed: {0}")]
    WarehouseWrite(#[from] WarehouseError),
}

impl JobError {
    /// The stage the run was in when it failed.
    pub fn failed_during(&self) -> JobState {
        match self {
            JobError::Upstream(_) => JobState::Fetching,
            JobError::Merge(_) => JobState::Merging,
            JobError::WarehouseWrite(_) => JobState::Loading,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: JobState,
    /// Provider the data came from.
    pub source: String,
    /// `dataset.table` the rows were loaded into.
    pub destination: String,
    pub rows_loaded: u64,
    /// Rendered leading rows of the merged table.
    pub preview: String,
}

/// Execute one snapshot run: fetch → merge → replace-load.
///
/// Fail-fast: the first error aborts the run at its stage and the
/// destination table keeps its prior contents.
pub fn run_snapshot(
    config: &JobConfig,
    provider: &dyn MarketDataProvider,
    warehouse: &dyn WarehouseClient,
) -> Result<RunReport, JobError> {
    // Fetching
    let chart = provider.fetch(&config.currency, config.lookback_days)?;
    chart.require_prices()?;

    // Merging
    let merged = merge::merge_chart(&chart)?;
    let preview = merge::preview(&merged, PREVIEW_ROWS);

    // Loading
    let destination = config.destination();
    let session = warehouse.acquire_session(&config.credential_ref)?;
    let rows_loaded = warehouse.replace_load(&session, &destination, &merged)?;

    Ok(RunReport {
        state: JobState::Succeeded,
        source: provider.name().to_string(),
        destination: destination.qualified_name(),
        rows_loaded,
        preview,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Fetching.is_terminal());
        assert!(!JobState::Loading.is_terminal());
    }

    #[test]
    fn errors_name_their_stage() {
        let fetch: JobError = FetchError::NoDataReturned.into();
        assert_eq!(fetch.failed_during(), JobState::Fetching);

        let write: JobError = WarehouseError::Write("disk full".into()).into();
        assert_eq!(write.failed_during(), JobState::Loading);
    }
}
