//! Values handed from one pipeline stage to the next.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Paths of the train and test partitions written by ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionResult {
    pub train_file_path: PathBuf,
    pub test_file_path: PathBuf,
}

impl IngestionResult {
    pub fn new(train_file_path: impl Into<PathBuf>, test_file_path: impl Into<PathBuf>) -> Self {
        Self {
            train_file_path: train_file_path.into(),
            test_file_path: test_file_path.into(),
        }
    }
}

/// Outcome of one validation run.
///
/// Under the default column-count policy the valid paths point at the files
/// validation read, not at the copies it wrote; the invalid paths are only
/// set when partitions were quarantined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `false` if any column drifted, or if partitions were quarantined.
    pub validation_status: bool,
    pub valid_train_file_path: Option<PathBuf>,
    pub valid_test_file_path: Option<PathBuf>,
    pub invalid_train_file_path: Option<PathBuf>,
    pub invalid_test_file_path: Option<PathBuf>,
    pub drift_report_file_path: PathBuf,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineArtifacts {
    pub ingestion: IngestionResult,
    pub validation: ValidationResult,
}
