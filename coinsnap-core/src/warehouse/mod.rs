//! Warehouse client seam: session acquisition and atomic replace-load.
//!
//! The core pipeline only sees the [`WarehouseClient`] trait, so how
//! credentials are sourced and where the bytes land is interchangeable.
//! The shipped implementation is a Parquet-backed store; tests inject an
//! in-memory recorder.

pub mod parquet;

pub use parquet::{ParquetWarehouse, TableMeta};

use crate::schema::SchemaError;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of the destination table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub project: String,
    pub dataset: String,
    pub table: String,
    /// Target region of the warehouse (e.g. "US").
    pub location: String,
}

impl Destination {
    /// The `dataset.table` name used in logs and reports.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.dataset, self.table)
    }
}

/// Opaque write session handed back by [`WarehouseClient::acquire_session`].
#[derive(Debug, Clone)]
pub struct Session {
    credential_ref: String,
}

impl Session {
    pub fn new(credential_ref: impl Into<String>) -> Self {
        Self {
            credential_ref: credential_ref.into(),
        }
    }

    pub fn credential_ref(&self) -> &str {
        &self.credential_ref
    }
}

/// Structured errors for the load stage.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("credential acquisition failed: {0}")]
    Credentials(String),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("table write failed: {0}")]
    Write(String),

    #[error("table read failed: {0}")]
    Read(String),
}

/// Trait for warehouse clients.
///
/// `replace_load` must be atomic from the caller's perspective: on failure
/// the destination table keeps its prior contents and schema; on success the
/// prior contents and schema are entirely gone.
pub trait WarehouseClient: Send + Sync {
    /// Human-readable name of this client.
    fn name(&self) -> &str;

    /// Acquire a write session for the given credential reference.
    fn acquire_session(&self, credential_ref: &str) -> Result<Session, WarehouseError>;

    /// Replace the destination table with `df` under the fixed snapshot
    /// schema. Creates the table if absent. Returns the number of rows
    /// loaded.
    fn replace_load(
        &self,
        session: &Session,
        destination: &Destination,
        df: &DataFrame,
    ) -> Result<u64, WarehouseError>;
}
