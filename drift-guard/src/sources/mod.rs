//! Reading and writing tabular files, and the record stores ingestion reads from.

use crate::prelude::*;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::prelude::{SessionConfig, SessionContext};
use std::fmt::Debug;
use tracing::debug;

mod csv;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use csv::{write_csv, CsvOptions, CsvSource};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Name of the store-internal identifier column dropped on export.
pub const STORE_ID_COLUMN: &str = "_id";

/// A persistent store the ingestion stage exports records from.
///
/// # Examples
///
/// ```rust,no_run
/// use drift_guard::sources::{CsvSource, RecordStore};
///
/// # async fn example() -> drift_guard::prelude::Result<()> {
/// let store = CsvSource::new("Network_Data/phisingData.csv");
/// let records = store.export_records().await?;
/// println!("{} rows from {}", records.num_rows(), store.description());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RecordStore: Debug + Send + Sync {
    /// Exports every record of the store as one batch.
    ///
    /// Implementations drop the [`STORE_ID_COLUMN`] if the store adds one.
    async fn export_records(&self) -> Result<RecordBatch>;

    /// Returns a human-readable description of this store.
    fn description(&self) -> String;
}

/// A session that reads each file as a single, order-preserving partition.
pub fn session_context() -> SessionContext {
    SessionContext::new_with_config(SessionConfig::new().with_target_partitions(1))
}

/// Removes the store's internal identifier column, if present.
pub fn drop_store_id(mut batch: RecordBatch) -> RecordBatch {
    if let Ok(index) = batch.schema().index_of(STORE_ID_COLUMN) {
        debug!(column = STORE_ID_COLUMN, "Dropping store identifier column");
        batch.remove_column(index);
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    #[test]
    fn test_drop_store_id() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("_id", DataType::Int64, false),
            Field::new("value", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(Int64Array::from(vec![10, 20])),
            ],
        )
        .unwrap();

        let dropped = drop_store_id(batch);
        assert_eq!(dropped.num_columns(), 1);
        assert_eq!(dropped.schema().field(0).name(), "value");

        // No identifier column: unchanged
        let again = drop_store_id(dropped.clone());
        assert_eq!(again, dropped);
    }
}
