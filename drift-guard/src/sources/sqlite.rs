//! SQLite-backed record store.

use super::{drop_store_id, RecordStore};
use crate::prelude::*;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// Text value the exporter treats as a missing cell.
const MISSING_MARKER: &str = "na";

/// Exports one table of a SQLite database.
///
/// Column types are derived from the stored values: a column holding only
/// integers becomes `Int64`, integers mixed with reals become `Float64`, and
/// anything else becomes text.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    table: String,
}

impl SqliteStore {
    /// Creates a store for `table` inside the database at `path`.
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self {
            path: path.into(),
            table,
        })
    }

    fn query(&self) -> rusqlite::Result<(Vec<String>, Vec<Vec<Value>>)> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM \"{}\"", self.table))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut cells: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (index, column) in cells.iter_mut().enumerate() {
                column.push(normalize(row.get::<_, Value>(index)?));
            }
        }
        Ok((names, cells))
    }
}

fn to_batch(names: Vec<String>, cells: Vec<Vec<Value>>) -> Result<RecordBatch> {
    let fields: Vec<Field> = names
        .iter()
        .zip(&cells)
        .map(|(name, values)| Field::new(name, column_type(values), true))
        .collect();
    let arrays: Vec<ArrayRef> = cells
        .into_iter()
        .zip(&fields)
        .map(|(values, field)| build_array(values, field.data_type()))
        .collect();
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

#[async_trait]
impl RecordStore for SqliteStore {
    #[instrument(skip(self), fields(db = %self.path.display(), table = %self.table))]
    async fn export_records(&self) -> Result<RecordBatch> {
        let (names, cells) = self.query().map_err(|e| {
            PipelineError::io_with_source(format!("cannot export {}", self.description()), e)
        })?;
        let batch = to_batch(names, cells)?;
        info!(rows = batch.num_rows(), "Exported records from SQLite");
        Ok(drop_store_id(batch))
    }

    fn description(&self) -> String {
        format!("SQLite table '{}' in {}", self.table, self.path.display())
    }
}

fn validate_identifier(identifier: &str) -> Result<()> {
    static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]{0,127}$").expect("Hard-coded regex pattern should be valid")
    });
    if IDENTIFIER_REGEX.is_match(identifier) {
        Ok(())
    } else {
        Err(PipelineError::configuration(format!(
            "invalid table name '{identifier}': expected letters, digits and underscores"
        )))
    }
}

fn normalize(value: Value) -> Value {
    match value {
        Value::Text(text) if text.trim().eq_ignore_ascii_case(MISSING_MARKER) => Value::Null,
        other => other,
    }
}

fn column_type(values: &[Value]) -> DataType {
    let mut data_type = DataType::Int64;
    for value in values {
        match value {
            Value::Null | Value::Integer(_) => {}
            Value::Real(_) => data_type = DataType::Float64,
            Value::Text(_) | Value::Blob(_) => return DataType::Utf8,
        }
    }
    data_type
}

fn build_array(values: Vec<Value>, data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Int64 => Arc::new(
            values
                .into_iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(i),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        DataType::Float64 => Arc::new(
            values
                .into_iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(i as f64),
                    Value::Real(r) => Some(r),
                    _ => None,
                })
                .collect::<Float64Array>(),
        ),
        _ => Arc::new(
            values
                .into_iter()
                .map(|v| match v {
                    Value::Null => None,
                    Value::Integer(i) => Some(i.to_string()),
                    Value::Real(r) => Some(r.to_string()),
                    Value::Text(t) => Some(t),
                    Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
                })
                .collect::<StringArray>(),
        ),
    }
}
