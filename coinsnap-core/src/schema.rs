use polars::prelude::*;

/// Fixed schema of the destination snapshot table.
///
/// The schema is applied explicitly on every write rather than inferred from
/// the data: a column that happens to be entirely null in one run must still
/// land as Float64 in the warehouse.
pub struct SnapshotSchema;

impl SnapshotSchema {
    /// Get the canonical snapshot schema.
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new(
                "time".into(),
                DataType::Datetime(TimeUnit::Milliseconds, None),
            ),
            Field::new("price_usd".into(), DataType::Float64),
            Field::new("market_cap_usd".into(), DataType::Float64),
            Field::new("volume_usd".into(), DataType::Float64),
        ])
    }

    /// Validate a DataFrame against the schema.
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let expected = Self::schema();
        let actual = df.schema();

        for field in expected.iter_fields() {
            if !actual.contains(field.name()) {
                return Err(SchemaError::MissingColumn(field.name().to_string()));
            }
        }

        for field in expected.iter_fields() {
            let actual_dtype = actual
                .get(field.name())
                .ok_or_else(|| SchemaError::MissingColumn(field.name().to_string()))?;
            if actual_dtype != field.dtype() {
                return Err(SchemaError::TypeMismatch {
                    column: field.name().to_string(),
                    expected: field.dtype().clone(),
                    actual: actual_dtype.clone(),
                });
            }
        }

        Ok(())
    }

    /// Cast every column to its declared type, in declared order.
    ///
    /// Columns not in the schema are dropped; missing columns are an error.
    pub fn enforce(df: &DataFrame) -> Result<DataFrame, SchemaError> {
        let expected = Self::schema();
        let mut columns = Vec::with_capacity(expected.len());

        for field in expected.iter_fields() {
            let column = df
                .column(field.name())
                .map_err(|_| SchemaError::MissingColumn(field.name().to_string()))?;
            let cast = column
                .cast(field.dtype())
                .map_err(|e| SchemaError::CastFailed {
                    column: field.name().to_string(),
                    reason: e.to_string(),
                })?;
            columns.push(cast);
        }

        DataFrame::new(columns).map_err(|e| SchemaError::CastFailed {
            column: "<frame>".to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },

    #[error("Failed to cast column {column}: {reason}")]
    CastFailed { column: String, reason: String },
}
