//! Printing pipeline artifacts.
//!
//! The binary prints the artifacts of a run through an [`ArtifactFormatter`]:
//! [`HumanFormatter`] for the console, [`JsonFormatter`] for other tools.
//!
//! # Examples
//!
//! ```rust
//! use drift_guard::artifacts::{IngestionResult, PipelineArtifacts, ValidationResult};
//! use drift_guard::formatters::{ArtifactFormatter, JsonFormatter};
//!
//! let artifacts = PipelineArtifacts {
//!     ingestion: IngestionResult::new("train.csv", "test.csv"),
//!     validation: ValidationResult {
//!         validation_status: true,
//!         valid_train_file_path: Some("train.csv".into()),
//!         valid_test_file_path: Some("test.csv".into()),
//!         invalid_train_file_path: None,
//!         invalid_test_file_path: None,
//!         drift_report_file_path: "report.yaml".into(),
//!     },
//! };
//! let json = JsonFormatter::new().format(&artifacts).unwrap();
//! assert!(json.contains("\"validation_status\": true"));
//! ```

use crate::artifacts::PipelineArtifacts;
use crate::prelude::*;
use std::fmt::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

/// Turns pipeline artifacts into printable text.
pub trait ArtifactFormatter {
    fn format(&self, artifacts: &PipelineArtifacts) -> Result<String>;
}

/// Output format selected for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for OutputFormat {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(PipelineError::configuration(format!(
                "unknown output format '{other}', expected 'human' or 'json'"
            ))),
        }
    }
}

impl OutputFormat {
    pub fn formatter(self) -> Box<dyn ArtifactFormatter> {
        match self {
            Self::Human => Box::new(HumanFormatter::new()),
            Self::Json => Box::new(JsonFormatter::new()),
        }
    }
}

/// Serializes artifacts as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactFormatter for JsonFormatter {
    fn format(&self, artifacts: &PipelineArtifacts) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(artifacts)
        } else {
            serde_json::to_string(artifacts)
        };
        json.map_err(|e| {
            PipelineError::Serialization(format!("Failed to serialize artifacts to JSON: {e}"))
        })
    }
}

/// Console summary of a run.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    use_colors: bool,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn render(&self, artifacts: &PipelineArtifacts) -> std::result::Result<String, fmt::Error> {
        let mut output = String::new();
        let validation = &artifacts.validation;

        writeln!(output)?;
        match (validation.validation_status, self.use_colors) {
            (true, true) => writeln!(output, "✅ \x1b[32mValidation PASSED\x1b[0m")?,
            (true, false) => writeln!(output, "✅ Validation PASSED")?,
            (false, true) => writeln!(output, "❌ \x1b[31mValidation FAILED\x1b[0m")?,
            (false, false) => writeln!(output, "❌ Validation FAILED")?,
        }

        writeln!(output)?;
        writeln!(output, "📥 Data Ingestion:")?;
        writeln!(output, "   Train: {}", artifacts.ingestion.train_file_path.display())?;
        writeln!(output, "   Test: {}", artifacts.ingestion.test_file_path.display())?;

        writeln!(output)?;
        writeln!(output, "🔍 Data Validation:")?;
        writeln!(output, "   Status: {}", validation.validation_status)?;
        write_optional(&mut output, "Valid train", &validation.valid_train_file_path)?;
        write_optional(&mut output, "Valid test", &validation.valid_test_file_path)?;
        write_optional(&mut output, "Invalid train", &validation.invalid_train_file_path)?;
        write_optional(&mut output, "Invalid test", &validation.invalid_test_file_path)?;
        writeln!(
            output,
            "   Drift report: {}",
            validation.drift_report_file_path.display()
        )?;
        Ok(output)
    }
}

fn write_optional(output: &mut String, label: &str, path: &Option<PathBuf>) -> fmt::Result {
    match path {
        Some(path) => writeln!(output, "   {label}: {}", path.display()),
        None => writeln!(output, "   {label}: -"),
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactFormatter for HumanFormatter {
    fn format(&self, artifacts: &PipelineArtifacts) -> Result<String> {
        self.render(artifacts)
            .map_err(|e| PipelineError::Serialization(format!("Failed to format artifacts: {e}")))
    }
}
