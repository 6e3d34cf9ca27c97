//! Runs the training pipeline once and prints its artifacts.
//!
//! Configuration comes from the environment (and a `.env` file); see
//! [`TrainingPipelineConfig::from_env`]. Set `PIPELINE_OUTPUT_FORMAT=json`
//! for machine-readable output.

use drift_guard::config::TrainingPipelineConfig;
use drift_guard::formatters::OutputFormat;
use drift_guard::logging::setup::init_logging;
use drift_guard::pipeline::TrainingPipeline;
use drift_guard::prelude::*;
use std::error::Error;
use std::process::ExitCode;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = init_logging(LoggingConfig::default().with_log_dir("logs")) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, kind = %err.kind(), "Training pipeline failed");
            eprintln!("Error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<String> {
    let config = TrainingPipelineConfig::from_env()?;
    let format = match std::env::var("PIPELINE_OUTPUT_FORMAT") {
        Ok(raw) => raw.parse::<OutputFormat>()?,
        Err(_) => OutputFormat::default(),
    };

    let artifacts = TrainingPipeline::new(config).run().await?;
    format.formatter().format(&artifacts)
}
