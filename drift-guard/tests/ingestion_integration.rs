//! Integration tests for ingestion and the full pipeline.

use arrow::array::{ArrayRef, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use drift_guard::components::DataIngestion;
use drift_guard::config::{
    ColumnCountPolicy, DataIngestionConfig, StoreConfig, TrainingPipelineConfig,
};
use drift_guard::pipeline::TrainingPipeline;
use drift_guard::prelude::*;
use drift_guard::sources::RecordStore;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Store returning a fixed batch.
#[derive(Debug)]
struct MemoryStore {
    batch: RecordBatch,
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn export_records(&self) -> Result<RecordBatch> {
        Ok(self.batch.clone())
    }

    fn description(&self) -> String {
        "in-memory store".to_string()
    }
}

fn write_source(dir: &Path, rows: usize) -> std::path::PathBuf {
    let mut csv = String::from("_id,having_IP_Address,URL_Length,Result\n");
    for i in 0..rows {
        csv.push_str(&format!("{i},{},{},{}\n", i % 2, i % 3, if i % 2 == 0 { 1 } else { -1 }));
    }
    let path = dir.join("phisingData.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn pipeline_config(dir: &TempDir, source: &Path) -> TrainingPipelineConfig {
    fs::write(
        dir.path().join("schema.yaml"),
        "having_IP_Address: int64\nURL_Length: int64\nResult: int64\n",
    )
    .unwrap();
    TrainingPipelineConfig::default()
        .with_artifact_root(dir.path().join("Artifacts"))
        .with_timestamp("01_02_2025_03_04_05")
        .with_store(StoreConfig::Csv {
            path: source.to_path_buf(),
        })
        .with_schema_file_path(dir.path().join("schema.yaml"))
}

fn data_rows(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_ingestion_writes_feature_store_and_split() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 10);
    let config = DataIngestionConfig::new(&pipeline_config(&dir, &source));

    let result = DataIngestion::from_config(config.clone())
        .unwrap()
        .initiate_data_ingestion()
        .await
        .unwrap();

    assert_eq!(result.train_file_path, config.training_file_path);
    assert_eq!(result.test_file_path, config.testing_file_path);

    let feature_store = fs::read_to_string(&config.feature_store_file_path).unwrap();
    assert!(feature_store.starts_with("having_IP_Address,URL_Length,Result\n"));
    assert_eq!(feature_store.lines().count(), 11);

    let train = data_rows(&result.train_file_path);
    let test = data_rows(&result.test_file_path);
    assert_eq!(train.len(), 8);
    assert_eq!(test.len(), 2);

    // Same multiset of rows as the feature store.
    let mut split: Vec<String> = train.into_iter().chain(test).collect();
    let mut all = data_rows(&config.feature_store_file_path);
    split.sort();
    all.sort();
    assert_eq!(split, all);
}

#[tokio::test]
async fn test_seeded_ingestion_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 40);
    let base = pipeline_config(&dir, &source);

    let first = DataIngestionConfig::new(&base.clone().with_timestamp("run_a"));
    let second = DataIngestionConfig::new(&base.with_timestamp("run_b"));
    for config in [&first, &second] {
        DataIngestion::from_config(config.clone())
            .unwrap()
            .initiate_data_ingestion()
            .await
            .unwrap();
    }

    assert_eq!(
        fs::read(&first.testing_file_path).unwrap(),
        fs::read(&second.testing_file_path).unwrap()
    );
}

#[tokio::test]
async fn test_ingestion_from_custom_store() {
    let dir = TempDir::new().unwrap();
    let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, false)]));
    let batch = RecordBatch::try_new(
        schema,
        vec![Arc::new(Int64Array::from((0..20).collect::<Vec<i64>>())) as ArrayRef],
    )
    .unwrap();
    let config = DataIngestionConfig::new(
        &TrainingPipelineConfig::default()
            .with_artifact_root(dir.path())
            .with_timestamp("custom"),
    )
    .with_split_ratio(0.25)
    .unwrap();

    let ingestion = DataIngestion::new(config, Box::new(MemoryStore { batch }));
    let result = ingestion.initiate_data_ingestion().await.unwrap();

    let train: BTreeSet<String> = data_rows(&result.train_file_path).into_iter().collect();
    let test: BTreeSet<String> = data_rows(&result.test_file_path).into_iter().collect();
    assert_eq!(train.len(), 15);
    assert_eq!(test.len(), 5);
    assert!(train.is_disjoint(&test));
}

#[tokio::test]
async fn test_missing_source_is_io_error() {
    let dir = TempDir::new().unwrap();
    let config = DataIngestionConfig::new(&pipeline_config(&dir, &dir.path().join("absent.csv")));

    let err = DataIngestion::from_config(config.clone())
        .unwrap()
        .initiate_data_ingestion()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!config.feature_store_file_path.exists());
}

#[tokio::test]
async fn test_too_few_rows_to_split() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 1);
    let config = DataIngestionConfig::new(&pipeline_config(&dir, &source));

    let err = DataIngestion::from_config(config)
        .unwrap()
        .initiate_data_ingestion()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataShape);
}

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 100);
    let config = pipeline_config(&dir, &source);
    let artifact_dir = config.artifact_dir();

    let artifacts = TrainingPipeline::new(config).run().await.unwrap();

    assert_eq!(
        artifacts.ingestion.train_file_path,
        artifact_dir.join("data_ingestion/ingested/train.csv")
    );
    assert_eq!(
        artifacts.validation.valid_train_file_path.as_ref(),
        Some(&artifacts.ingestion.train_file_path)
    );
    assert_eq!(
        artifacts.validation.drift_report_file_path,
        artifact_dir.join("data_validation/drift_report/report.yaml")
    );
    assert!(artifact_dir.join("data_validation/validated/train.csv").is_file());
    assert!(artifact_dir.join("data_validation/validated/test.csv").is_file());

    let report: serde_yaml::Mapping = serde_yaml::from_str(
        &fs::read_to_string(&artifacts.validation.drift_report_file_path).unwrap(),
    )
    .unwrap();
    assert_eq!(report.len(), 3);
}

#[tokio::test]
async fn test_pipeline_quarantines_on_schema_mismatch() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 30);
    let config = pipeline_config(&dir, &source)
        .with_schema_file_path({
            let path = dir.path().join("wide_schema.yaml");
            fs::write(&path, "a: int64\nb: int64\nc: int64\nd: int64\n").unwrap();
            path
        })
        .with_column_count_policy(ColumnCountPolicy::Quarantine);

    let artifacts = TrainingPipeline::new(config).run().await.unwrap();

    assert!(!artifacts.validation.validation_status);
    assert!(artifacts.validation.valid_train_file_path.is_none());
    assert!(artifacts
        .validation
        .invalid_train_file_path
        .as_ref()
        .is_some_and(|p| p.is_file()));
}

#[tokio::test]
async fn test_pipeline_fails_without_schema() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 10);
    let config =
        pipeline_config(&dir, &source).with_schema_file_path(dir.path().join("missing.yaml"));

    let err = TrainingPipeline::new(config).run().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
