//! Parquet-backed warehouse client.
//!
//! Layout: `{root}/{project}/{dataset}/{table}.parquet`
//!
//! Features:
//! - Atomic replace (write to .tmp, rename into place)
//! - Fixed snapshot schema enforced before any bytes hit disk
//! - Metadata sidecar per table (row count, location, load time)

use super::{Destination, Session, WarehouseClient, WarehouseError};
use crate::schema::SnapshotSchema;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata sidecar for a loaded table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMeta {
    pub project: String,
    pub dataset: String,
    pub table: String,
    pub location: String,
    pub row_count: usize,
    pub loaded_at: chrono::NaiveDateTime,
}

/// The Parquet warehouse.
pub struct ParquetWarehouse {
    root: PathBuf,
}

impl ParquetWarehouse {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the warehouse.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the Parquet file backing a destination table.
    pub fn table_path(&self, destination: &Destination) -> PathBuf {
        self.root
            .join(&destination.project)
            .join(&destination.dataset)
            .join(format!("{}.parquet", destination.table))
    }

    fn meta_path(&self, destination: &Destination) -> PathBuf {
        self.root
            .join(&destination.project)
            .join(&destination.dataset)
            .join(format!("{}.meta.json", destination.table))
    }

    /// Whether the destination table currently exists.
    pub fn table_exists(&self, destination: &Destination) -> bool {
        self.table_path(destination).exists()
    }

    /// Read the destination table back. Supports tests and the status
    /// command; the pipeline itself never reads the warehouse.
    pub fn read_table(&self, destination: &Destination) -> Result<DataFrame, WarehouseError> {
        let path = self.table_path(destination);
        let file = fs::File::open(&path)
            .map_err(|e| WarehouseError::Read(format!("open {}: {e}", path.display())))?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| WarehouseError::Read(format!("read {}: {e}", path.display())))
    }

    /// Read the metadata sidecar for a destination table, if present.
    pub fn get_meta(&self, destination: &Destination) -> Option<TableMeta> {
        let content = fs::read_to_string(self.meta_path(destination)).ok()?;
        serde_json::from_str(&content).ok()
    }
}

impl WarehouseClient for ParquetWarehouse {
    fn name(&self) -> &str {
        "parquet_warehouse"
    }

    fn acquire_session(&self, credential_ref: &str) -> Result<Session, WarehouseError> {
        if credential_ref.is_empty() {
            return Err(WarehouseError::Credentials(
                "empty credential reference".into(),
            ));
        }
        fs::create_dir_all(&self.root).map_err(|e| {
            WarehouseError::Credentials(format!(
                "warehouse root {} unusable: {e}",
                self.root.display()
            ))
        })?;
        Ok(Session::new(credential_ref))
    }

    fn replace_load(
        &self,
        _session: &Session,
        destination: &Destination,
        df: &DataFrame,
    ) -> Result<u64, WarehouseError> {
        let mut enforced = SnapshotSchema::enforce(df)?;

        let path = self.table_path(destination);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| WarehouseError::Write(format!("create dataset dir: {e}")))?;
        }

        // Write to a temp file, then rename: a failure at any point leaves
        // the prior table intact.
        let tmp_path = path.with_extension("parquet.tmp");
        let file = fs::File::create(&tmp_path)
            .map_err(|e| WarehouseError::Write(format!("create temp file: {e}")))?;
        ParquetWriter::new(file).finish(&mut enforced).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            WarehouseError::Write(format!("write parquet: {e}"))
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            WarehouseError::Write(format!("atomic rename failed: {e}"))
        })?;

        let meta = TableMeta {
            project: destination.project.clone(),
            dataset: destination.dataset.clone(),
            table: destination.table.clone(),
            location: destination.location.clone(),
            row_count: enforced.height(),
            loaded_at: chrono::Utc::now().naive_utc(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| WarehouseError::Write(format!("meta serialization: {e}")))?;
        fs::write(self.meta_path(destination), meta_json)
            .map_err(|e| WarehouseError::Write(format!("meta write: {e}")))?;

        Ok(enforced.height() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_root() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("coinsnap_test_{}_{id}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn dest() -> Destination {
        Destination {
            project: "demo-project".into(),
            dataset: "analytics".into(),
            table: "bitcoin_history_daily".into(),
            location: "US".into(),
        }
    }

    fn snapshot_frame(times: &[i64], prices: &[f64]) -> DataFrame {
        let time = Column::new("time".into(), times.to_vec())
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        DataFrame::new(vec![
            time,
            Column::new("price_usd".into(), prices.to_vec()),
            Column::new("market_cap_usd".into(), vec![2000.0; prices.len()]),
            Column::new("volume_usd".into(), vec![50.0; prices.len()]),
        ])
        .unwrap()
    }

    #[test]
    fn load_and_read_roundtrip() {
        let root = temp_root();
        let warehouse = ParquetWarehouse::new(&root);
        let session = warehouse.acquire_session("default").unwrap();

        let df = snapshot_frame(&[1000, 2000], &[100.0, 110.0]);
        let rows = warehouse.replace_load(&session, &dest(), &df).unwrap();
        assert_eq!(rows, 2);

        let read = warehouse.read_table(&dest()).unwrap();
        assert!(read.equals_missing(&df));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn second_load_fully_replaces_first() {
        let root = temp_root();
        let warehouse = ParquetWarehouse::new(&root);
        let session = warehouse.acquire_session("default").unwrap();

        let first = snapshot_frame(&[1000, 2000, 3000], &[1.0, 2.0, 3.0]);
        warehouse.replace_load(&session, &dest(), &first).unwrap();

        let second = snapshot_frame(&[9000], &[9.0]);
        let rows = warehouse.replace_load(&session, &dest(), &second).unwrap();
        assert_eq!(rows, 1);

        let read = warehouse.read_table(&dest()).unwrap();
        assert_eq!(read.height(), 1);
        assert!(read.equals_missing(&second));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn load_rejects_frame_missing_columns() {
        let root = temp_root();
        let warehouse = ParquetWarehouse::new(&root);
        let session = warehouse.acquire_session("default").unwrap();

        let bad = DataFrame::new(vec![Column::new("price_usd".into(), vec![1.0])]).unwrap();
        let result = warehouse.replace_load(&session, &dest(), &bad);

        assert!(matches!(result, Err(WarehouseError::Schema(_))));
        assert!(!warehouse.table_exists(&dest()));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn empty_credential_ref_is_rejected() {
        let root = temp_root();
        let warehouse = ParquetWarehouse::new(&root);

        let result = warehouse.acquire_session("");
        assert!(matches!(result, Err(WarehouseError::Credentials(_))));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn meta_sidecar_reflects_last_load() {
        let root = temp_root();
        let warehouse = ParquetWarehouse::new(&root);
        let session = warehouse.acquire_session("default").unwrap();

        let df = snapshot_frame(&[1000, 2000], &[100.0, 110.0]);
        warehouse.replace_load(&session, &dest(), &df).unwrap();

        let meta = warehouse.get_meta(&dest()).unwrap();
        assert_eq!(meta.row_count, 2);
        assert_eq!(meta.table, "bitcoin_history_daily");
        assert_eq!(meta.location, "US");

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn read_missing_table_is_error() {
        let root = temp_root();
        let warehouse = ParquetWarehouse::new(&root);

        let result = warehouse.read_table(&dest());
        assert!(matches!(result, Err(WarehouseError::Read(_))));

        let _ = fs::remove_dir_all(&root);
    }
}
