//! Prelude for commonly used types and traits in drift-guard.

pub use crate::error::{ErrorContext, ErrorKind, PipelineError, Result};
pub use crate::formatters::ArtifactFormatter;
pub use crate::logging::setup::LoggingConfig;
