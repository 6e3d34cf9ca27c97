//! Runs ingestion followed by validation.

use crate::artifacts::PipelineArtifacts;
use crate::components::{DataIngestion, DataValidation};
use crate::config::{DataIngestionConfig, DataValidationConfig, TrainingPipelineConfig};
use crate::prelude::*;
use tracing::{info, instrument};

/// One end-to-end run over a fresh artifact directory.
///
/// # Examples
///
/// ```rust,no_run
/// use drift_guard::config::TrainingPipelineConfig;
/// use drift_guard::pipeline::TrainingPipeline;
///
/// # async fn example() -> drift_guard::prelude::Result<()> {
/// let artifacts = TrainingPipeline::new(TrainingPipelineConfig::from_env()?)
///     .run()
///     .await?;
/// println!("validation status: {}", artifacts.validation.validation_status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    config: TrainingPipelineConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingPipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingPipelineConfig {
        &self.config
    }

    #[instrument(skip(self), fields(pipeline = %self.config.pipeline_name, artifacts = %self.config.artifact_dir().display()))]
    pub async fn run(&self) -> Result<PipelineArtifacts> {
        info!("Starting training pipeline");

        let ingestion = DataIngestion::from_config(DataIngestionConfig::new(&self.config))?
            .initiate_data_ingestion()
            .await
            .context("data ingestion failed")?;

        let validation = DataValidation::new(ingestion.clone(), DataValidationConfig::new(&self.config))?
            .initiate_validation()
            .await
            .context("data validation failed")?;

        info!(status = validation.validation_status, "Training pipeline finished");
        Ok(PipelineArtifacts {
            ingestion,
            validation,
        })
    }
}
