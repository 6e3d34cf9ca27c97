//! Ingestion stage: export records, keep a feature-store copy, split train/test.

use crate::artifacts::IngestionResult;
use crate::config::{DataIngestionConfig, StoreConfig};
use crate::prelude::*;
use crate::sources::{write_csv, CsvSource, RecordStore};
use arrow::array::UInt64Array;
use arrow::compute::take_record_batch;
use arrow::record_batch::RecordBatch;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, instrument};

/// Row indices assigned to each side of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<u64>,
    pub test: Vec<u64>,
}

/// Shuffles `0..num_rows` and assigns the first `ceil(ratio * num_rows)` to test.
///
/// With `seed = None` the shuffle draws from OS entropy.
pub fn split_indices(num_rows: usize, ratio: f64, seed: Option<u64>) -> Result<SplitIndices> {
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(PipelineError::configuration(format!(
            "train/test split ratio must be between 0 and 1 (exclusive), got {ratio}"
        )));
    }
    let num_test = (ratio * num_rows as f64).ceil() as usize;
    let num_train = num_rows.saturating_sub(num_test);
    if num_test == 0 || num_train == 0 {
        return Err(PipelineError::DataShape(format!(
            "cannot split {num_rows} rows with test ratio {ratio}: train would have {num_train} rows and test {num_test}"
        )));
    }

    let mut indices: Vec<u64> = (0..num_rows as u64).collect();
    match seed {
        Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => indices.shuffle(&mut rand::rng()),
    }
    let train = indices.split_off(num_test);
    Ok(SplitIndices {
        train,
        test: indices,
    })
}

/// Builds the record store named by the configuration.
pub fn store_from_config(store: &StoreConfig) -> Result<Box<dyn RecordStore>> {
    match store {
        StoreConfig::Csv { path } => Ok(Box::new(CsvSource::new(path.clone()))),
        #[cfg(feature = "sqlite")]
        StoreConfig::Sqlite { path, table } => Ok(Box::new(crate::sources::SqliteStore::new(
            path.clone(),
            table.clone(),
        )?)),
        #[cfg(not(feature = "sqlite"))]
        StoreConfig::Sqlite { path, .. } => Err(PipelineError::configuration(format!(
            "{} is a SQLite store but drift-guard was built without the `sqlite` feature",
            path.display()
        ))),
    }
}

/// Exports the raw records and writes the train and test partitions.
#[derive(Debug)]
pub struct DataIngestion {
    config: DataIngestionConfig,
    store: Box<dyn RecordStore>,
}

impl DataIngestion {
    pub fn new(config: DataIngestionConfig, store: Box<dyn RecordStore>) -> Self {
        Self { config, store }
    }

    /// Uses the store named in `config`.
    pub fn from_config(config: DataIngestionConfig) -> Result<Self> {
        let store = store_from_config(&config.store)?;
        Ok(Self::new(config, store))
    }

    pub fn config(&self) -> &DataIngestionConfig {
        &self.config
    }

    /// Reads every record of the collection from the store.
    #[instrument(skip(self), fields(database = %self.config.database_name, collection = %self.config.collection_name))]
    pub async fn export_collection(&self) -> Result<RecordBatch> {
        let records = self
            .store
            .export_records()
            .await
            .with_context(|| format!("failed to export {}", self.store.description()))?;
        info!(
            rows = records.num_rows(),
            columns = records.num_columns(),
            "Exported collection"
        );
        Ok(records)
    }

    /// Writes the raw export to the feature store file.
    pub fn export_data_into_feature_store(&self, records: &RecordBatch) -> Result<()> {
        write_csv(records, &self.config.feature_store_file_path)
            .context("failed to write feature store")
    }

    /// Splits `records` into (train, test) batches.
    pub fn split_data_as_train_test(
        &self,
        records: &RecordBatch,
    ) -> Result<(RecordBatch, RecordBatch)> {
        let split = split_indices(
            records.num_rows(),
            self.config.train_test_split_ratio,
            self.config.split_seed,
        )?;
        let train = take_record_batch(records, &UInt64Array::from(split.train))?;
        let test = take_record_batch(records, &UInt64Array::from(split.test))?;
        info!(
            train_rows = train.num_rows(),
            test_rows = test.num_rows(),
            seed = ?self.config.split_seed,
            "Performed train/test split"
        );
        Ok((train, test))
    }

    #[instrument(skip(self))]
    pub async fn initiate_data_ingestion(&self) -> Result<IngestionResult> {
        info!("Starting data ingestion");
        let records = self.export_collection().await?;
        self.export_data_into_feature_store(&records)?;

        let (train, test) = self.split_data_as_train_test(&records)?;
        write_csv(&train, &self.config.training_file_path).context("failed to write train partition")?;
        write_csv(&test, &self.config.testing_file_path).context("failed to write test partition")?;

        let result = IngestionResult::new(
            self.config.training_file_path.clone(),
            self.config.testing_file_path.clone(),
        );
        info!(
            train = %result.train_file_path.display(),
            test = %result.test_file_path.display(),
            "Data ingestion complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_split_sizes() {
        let split = split_indices(10, 0.2, Some(42)).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        // ceil(0.2 * 11) = 3
        let split = split_indices(11, 0.2, Some(42)).unwrap();
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn test_split_covers_every_row_once() {
        let split = split_indices(50, 0.3, Some(7)).unwrap();
        let all: BTreeSet<u64> = split.train.iter().chain(&split.test).copied().collect();
        assert_eq!(all.len(), 50);
        assert_eq!(all, (0..50).collect());
    }

    #[test]
    fn test_seeded_split_is_reproducible() {
        let a = split_indices(100, 0.2, Some(42)).unwrap();
        let b = split_indices(100, 0.2, Some(42)).unwrap();
        assert_eq!(a, b);
        let c = split_indices(100, 0.2, Some(43)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_rejects_degenerate_input() {
        assert_eq!(
            split_indices(10, 0.0, None).unwrap_err().kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            split_indices(10, 1.0, None).unwrap_err().kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            split_indices(1, 0.2, None).unwrap_err().kind(),
            ErrorKind::DataShape
        );
        assert_eq!(
            split_indices(0, 0.2, None).unwrap_err().kind(),
            ErrorKind::DataShape
        );
    }

    #[cfg(not(feature = "sqlite"))]
    #[test]
    fn test_sqlite_store_requires_feature() {
        let store = StoreConfig::Sqlite {
            path: "records.db".into(),
            table: "NetworkData".into(),
        };
        let err = store_from_config(&store).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
