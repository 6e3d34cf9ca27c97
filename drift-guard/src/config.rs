//! Pipeline configuration.
//!
//! Every run writes into its own artifact directory,
//! `<artifact_root>/<timestamp>/`, laid out as:
//!
//! ```text
//! data_ingestion/feature_store/PhysingData.csv
//! data_ingestion/ingested/{train,test}.csv
//! data_validation/validated/{train,test}.csv
//! data_validation/invalid/{train,test}.csv
//! data_validation/drift_report/report.yaml
//! ```
//!
//! Stage configs are derived from a [`TrainingPipelineConfig`] and can be
//! adjusted afterwards with their `with_*` methods.

use crate::prelude::*;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const PIPELINE_NAME: &str = "NetworkSecurity";
pub const ARTIFACT_DIR: &str = "Artifacts";
pub const FILE_NAME: &str = "PhysingData.csv";
pub const TRAIN_FILE_NAME: &str = "train.csv";
pub const TEST_FILE_NAME: &str = "test.csv";
pub const SCHEMA_FILE_PATH: &str = "data_schema/schema.yaml";

pub const DATA_INGESTION_DATABASE_NAME: &str = "PROJECTS";
pub const DATA_INGESTION_COLLECTION_NAME: &str = "NetworkData";
pub const DATA_INGESTION_DIR_NAME: &str = "data_ingestion";
pub const DATA_INGESTION_FEATURE_STORE_DIR: &str = "feature_store";
pub const DATA_INGESTION_INGESTED_DIR: &str = "ingested";
pub const DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO: f64 = 0.2;
pub const DATA_INGESTION_SPLIT_SEED: u64 = 42;

pub const DATA_VALIDATION_DIR_NAME: &str = "data_validation";
pub const DATA_VALIDATION_VALID_DIR: &str = "validated";
pub const DATA_VALIDATION_INVALID_DIR: &str = "invalid";
pub const DATA_VALIDATION_DRIFT_REPORT_DIR: &str = "drift_report";
pub const DATA_VALIDATION_DRIFT_REPORT_FILE_NAME: &str = "report.yaml";
pub const DATA_VALIDATION_DRIFT_THRESHOLD: f64 = 0.05;

/// Default raw export read by the CSV record store.
pub const SOURCE_CSV_PATH: &str = "Network_Data/phisingData.csv";

/// Timestamp format used for artifact and log directory names.
pub const TIMESTAMP_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";

/// What the validator does with the column-count check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnCountPolicy {
    /// Log a mismatch and carry on; the result's status reflects drift only.
    #[default]
    Record,
    /// Route both partitions to the invalid paths and fail the run's status
    /// when either partition's column count differs from the schema.
    Quarantine,
}

impl FromStr for ColumnCountPolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "record" => Ok(Self::Record),
            "quarantine" => Ok(Self::Quarantine),
            other => Err(PipelineError::configuration(format!(
                "unknown column count policy '{other}' (expected 'record' or 'quarantine')"
            ))),
        }
    }
}

/// Where the ingestion stage reads records from.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    /// A raw CSV export.
    Csv { path: PathBuf },
    /// A table inside a SQLite database file.
    Sqlite { path: PathBuf, table: String },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Csv {
            path: PathBuf::from(SOURCE_CSV_PATH),
        }
    }
}

/// Top-level configuration shared by both stages.
#[derive(Debug, Clone)]
pub struct TrainingPipelineConfig {
    pub pipeline_name: String,
    pub artifact_root: PathBuf,
    pub timestamp: String,
    pub store: StoreConfig,
    pub schema_file_path: PathBuf,
    pub drift_threshold: f64,
    pub column_count_policy: ColumnCountPolicy,
}

impl Default for TrainingPipelineConfig {
    fn default() -> Self {
        Self::at(Local::now())
    }
}

impl TrainingPipelineConfig {
    /// Creates a configuration whose artifact directory is named after `time`.
    pub fn at(time: DateTime<Local>) -> Self {
        Self {
            pipeline_name: PIPELINE_NAME.to_string(),
            artifact_root: PathBuf::from(ARTIFACT_DIR),
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
            store: StoreConfig::default(),
            schema_file_path: PathBuf::from(SCHEMA_FILE_PATH),
            drift_threshold: DATA_VALIDATION_DRIFT_THRESHOLD,
            column_count_policy: ColumnCountPolicy::default(),
        }
    }

    /// Builds the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first, if present.
    /// Recognised variables:
    ///
    /// - `PIPELINE_ARTIFACT_ROOT`: root of all artifact directories
    /// - `PIPELINE_SCHEMA_PATH`: schema YAML file
    /// - `PIPELINE_SOURCE_CSV`: raw CSV export used as record store
    /// - `PIPELINE_SQLITE_PATH`: SQLite database used as record store
    ///   (takes precedence over `PIPELINE_SOURCE_CSV`)
    /// - `PIPELINE_DRIFT_THRESHOLD`: p-value threshold in (0, 1)
    /// - `PIPELINE_COLUMN_COUNT_POLICY`: `record` or `quarantine`
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup("PIPELINE_ARTIFACT_ROOT") {
            config = config.with_artifact_root(root);
        }
        if let Some(schema) = lookup("PIPELINE_SCHEMA_PATH") {
            config = config.with_schema_file_path(schema);
        }
        if let Some(path) = lookup("PIPELINE_SQLITE_PATH") {
            config = config.with_store(StoreConfig::Sqlite {
                path: PathBuf::from(path),
                table: DATA_INGESTION_COLLECTION_NAME.to_string(),
            });
        } else if let Some(path) = lookup("PIPELINE_SOURCE_CSV") {
            config = config.with_store(StoreConfig::Csv {
                path: PathBuf::from(path),
            });
        }
        if let Some(raw) = lookup("PIPELINE_DRIFT_THRESHOLD") {
            let threshold = raw.trim().parse::<f64>().map_err(|e| {
                PipelineError::configuration_with_source(
                    format!("PIPELINE_DRIFT_THRESHOLD is not a number: '{raw}'"),
                    e,
                )
            })?;
            config = config.with_drift_threshold(threshold)?;
        }
        if let Some(raw) = lookup("PIPELINE_COLUMN_COUNT_POLICY") {
            config = config.with_column_count_policy(raw.parse()?);
        }

        Ok(config)
    }

    pub fn with_artifact_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.artifact_root = root.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    pub fn with_schema_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_file_path = path.into();
        self
    }

    /// Sets the drift p-value threshold. Must lie strictly between 0 and 1.
    pub fn with_drift_threshold(mut self, threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        self.drift_threshold = threshold;
        Ok(self)
    }

    pub fn with_column_count_policy(mut self, policy: ColumnCountPolicy) -> Self {
        self.column_count_policy = policy;
        self
    }

    /// `<artifact_root>/<timestamp>`
    pub fn artifact_dir(&self) -> PathBuf {
        self.artifact_root.join(&self.timestamp)
    }
}

/// Paths and parameters of the ingestion stage.
#[derive(Debug, Clone)]
pub struct DataIngestionConfig {
    pub data_ingestion_dir: PathBuf,
    pub feature_store_file_path: PathBuf,
    pub training_file_path: PathBuf,
    pub testing_file_path: PathBuf,
    pub train_test_split_ratio: f64,
    /// `None` shuffles with OS entropy; runs are then not reproducible.
    pub split_seed: Option<u64>,
    pub store: StoreConfig,
    pub database_name: String,
    pub collection_name: String,
}

impl DataIngestionConfig {
    pub fn new(pipeline: &TrainingPipelineConfig) -> Self {
        let data_ingestion_dir = pipeline.artifact_dir().join(DATA_INGESTION_DIR_NAME);
        let ingested_dir = data_ingestion_dir.join(DATA_INGESTION_INGESTED_DIR);
        Self {
            feature_store_file_path: data_ingestion_dir
                .join(DATA_INGESTION_FEATURE_STORE_DIR)
                .join(FILE_NAME),
            training_file_path: ingested_dir.join(TRAIN_FILE_NAME),
            testing_file_path: ingested_dir.join(TEST_FILE_NAME),
            data_ingestion_dir,
            train_test_split_ratio: DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO,
            split_seed: Some(DATA_INGESTION_SPLIT_SEED),
            store: pipeline.store.clone(),
            database_name: DATA_INGESTION_DATABASE_NAME.to_string(),
            collection_name: DATA_INGESTION_COLLECTION_NAME.to_string(),
        }
    }

    /// Sets the fraction of rows assigned to the test partition.
    pub fn with_split_ratio(mut self, ratio: f64) -> Result<Self> {
        validate_ratio(ratio)?;
        self.train_test_split_ratio = ratio;
        Ok(self)
    }

    pub fn with_split_seed(mut self, seed: Option<u64>) -> Self {
        self.split_seed = seed;
        self
    }
}

/// Paths and parameters of the validation stage.
#[derive(Debug, Clone)]
pub struct DataValidationConfig {
    pub data_validation_dir: PathBuf,
    pub schema_file_path: PathBuf,
    pub valid_train_file_path: PathBuf,
    pub valid_test_file_path: PathBuf,
    pub invalid_train_file_path: PathBuf,
    pub invalid_test_file_path: PathBuf,
    pub drift_report_file_path: PathBuf,
    pub drift_threshold: f64,
    pub column_count_policy: ColumnCountPolicy,
}

impl DataValidationConfig {
    pub fn new(pipeline: &TrainingPipelineConfig) -> Self {
        Self::in_dir(
            pipeline.artifact_dir().join(DATA_VALIDATION_DIR_NAME),
            &pipeline.schema_file_path,
        )
        .with_threshold_unchecked(pipeline.drift_threshold)
        .with_column_count_policy(pipeline.column_count_policy)
    }

    /// Lays out the validation outputs under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>, schema_file_path: impl AsRef<Path>) -> Self {
        let data_validation_dir = dir.into();
        let valid_dir = data_validation_dir.join(DATA_VALIDATION_VALID_DIR);
        let invalid_dir = data_validation_dir.join(DATA_VALIDATION_INVALID_DIR);
        Self {
            schema_file_path: schema_file_path.as_ref().to_path_buf(),
            valid_train_file_path: valid_dir.join(TRAIN_FILE_NAME),
            valid_test_file_path: valid_dir.join(TEST_FILE_NAME),
            invalid_train_file_path: invalid_dir.join(TRAIN_FILE_NAME),
            invalid_test_file_path: invalid_dir.join(TEST_FILE_NAME),
            drift_report_file_path: data_validation_dir
                .join(DATA_VALIDATION_DRIFT_REPORT_DIR)
                .join(DATA_VALIDATION_DRIFT_REPORT_FILE_NAME),
            data_validation_dir,
            drift_threshold: DATA_VALIDATION_DRIFT_THRESHOLD,
            column_count_policy: ColumnCountPolicy::default(),
        }
    }

    /// Sets the drift p-value threshold. Must lie strictly between 0 and 1.
    pub fn with_drift_threshold(self, threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(self.with_threshold_unchecked(threshold))
    }

    fn with_threshold_unchecked(mut self, threshold: f64) -> Self {
        self.drift_threshold = threshold;
        self
    }

    pub fn with_column_count_policy(mut self, policy: ColumnCountPolicy) -> Self {
        self.column_count_policy = policy;
        self
    }
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold > 0.0 && threshold < 1.0 {
        Ok(())
    } else {
        Err(PipelineError::configuration(format!(
            "drift threshold must be in (0, 1), got {threshold}"
        )))
    }
}

fn validate_ratio(ratio: f64) -> Result<()> {
    if ratio > 0.0 && ratio < 1.0 {
        Ok(())
    } else {
        Err(PipelineError::configuration(format!(
            "train/test split ratio must be in (0, 1), got {ratio}"
        )))
    }
}
