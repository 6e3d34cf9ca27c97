//! Validation stage: column-count checks and drift detection over the split.

use crate::artifacts::{IngestionResult, ValidationResult};
use crate::config::{ColumnCountPolicy, DataValidationConfig};
use crate::constraints::{ColumnCountConstraint, Constraint, ConstraintResult};
use crate::drift::{DriftDetector, DriftReport};
use crate::logging::truncate_field;
use crate::partition::Partition;
use crate::prelude::*;
use crate::schema::SchemaDefinition;
use crate::sources::{session_context, write_csv, CsvSource};
use datafusion::prelude::SessionContext;
use std::path::Path;
use tracing::{info, instrument, warn};

const MAX_LOGGED_COLUMNS_LEN: usize = 512;

/// Validates the partitions produced by ingestion.
///
/// The schema is read once, when the validator is built, and reused for
/// every check.
#[derive(Debug, Clone)]
pub struct DataValidation {
    ingestion: IngestionResult,
    config: DataValidationConfig,
    schema: SchemaDefinition,
}

impl DataValidation {
    /// Loads the schema from `config.schema_file_path`.
    pub fn new(ingestion: IngestionResult, config: DataValidationConfig) -> Result<Self> {
        let schema = SchemaDefinition::from_yaml_file(&config.schema_file_path)
            .context("failed to initialize data validation")?;
        Ok(Self::with_schema(ingestion, config, schema))
    }

    /// Uses an already loaded schema.
    pub fn with_schema(
        ingestion: IngestionResult,
        config: DataValidationConfig,
        schema: SchemaDefinition,
    ) -> Self {
        Self {
            ingestion,
            config,
            schema,
        }
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    pub fn config(&self) -> &DataValidationConfig {
        &self.config
    }

    /// Reads a CSV file into a partition named `name`.
    pub async fn read_data(ctx: &SessionContext, path: &Path, name: &str) -> Result<Partition> {
        CsvSource::new(path).load(ctx, name).await
    }

    fn check_column_count(&self, partition: &Partition) -> ConstraintResult {
        ColumnCountConstraint::for_schema(&self.schema).evaluate(partition)
    }

    /// `true` iff `partition` has as many columns as the schema declares.
    pub fn validate_column_count(&self, partition: &Partition) -> bool {
        self.check_column_count(partition).status.is_success()
    }

    /// Runs drift detection and writes the report.
    ///
    /// Returns the overall status (`false` if any column drifted) and the
    /// report. Nothing is written when detection fails.
    pub fn detect_drift(&self, base: &Partition, current: &Partition) -> Result<(bool, DriftReport)> {
        let report = DriftDetector::new(self.config.drift_threshold).detect(base, current)?;
        report
            .write_yaml(&self.config.drift_report_file_path)
            .context("failed to write drift report")?;
        Ok((report.status(), report))
    }

    #[instrument(skip(self), fields(policy = ?self.config.column_count_policy))]
    pub async fn initiate_validation(&self) -> Result<ValidationResult> {
        info!("Starting data validation");
        let ctx = session_context();
        let train = Self::read_data(&ctx, &self.ingestion.train_file_path, "train").await?;
        let test = Self::read_data(&ctx, &self.ingestion.test_file_path, "test").await?;

        let mut columns_conform = true;
        for partition in [&train, &test] {
            let result = self.check_column_count(partition);
            if result.status.is_failure() {
                columns_conform = false;
                warn!(
                    partition = partition.name(),
                    columns = %truncate_field(&partition.column_names().join(","), MAX_LOGGED_COLUMNS_LEN),
                    reason = result.message.as_deref().unwrap_or_default(),
                    "Partition does not contain all columns"
                );
            }
        }

        let (drift_status, report) = self.detect_drift(&train, &test)?;

        let result = match self.config.column_count_policy {
            ColumnCountPolicy::Quarantine if !columns_conform => self.quarantine(&train, &test)?,
            _ => {
                write_csv(train.batch(), &self.config.valid_train_file_path)
                    .context("failed to write validated train partition")?;
                write_csv(test.batch(), &self.config.valid_test_file_path)
                    .context("failed to write validated test partition")?;
                ValidationResult {
                    validation_status: drift_status,
                    valid_train_file_path: Some(self.ingestion.train_file_path.clone()),
                    valid_test_file_path: Some(self.ingestion.test_file_path.clone()),
                    invalid_train_file_path: None,
                    invalid_test_file_path: None,
                    drift_report_file_path: self.config.drift_report_file_path.clone(),
                }
            }
        };

        info!(
            status = result.validation_status,
            drifted = report.drifted_columns().len(),
            report = %result.drift_report_file_path.display(),
            "Data validation complete"
        );
        Ok(result)
    }

    fn quarantine(&self, train: &Partition, test: &Partition) -> Result<ValidationResult> {
        warn!("Column count mismatch, routing partitions to the invalid directory");
        write_csv(train.batch(), &self.config.invalid_train_file_path)
            .context("failed to write invalid train partition")?;
        write_csv(test.batch(), &self.config.invalid_test_file_path)
            .context("failed to write invalid test partition")?;
        Ok(ValidationResult {
            validation_status: false,
            valid_train_file_path: None,
            valid_test_file_path: None,
            invalid_train_file_path: Some(self.config.invalid_train_file_path.clone()),
            invalid_test_file_path: Some(self.config.invalid_test_file_path.clone()),
            drift_report_file_path: self.config.drift_report_file_path.clone(),
        })
    }
}
