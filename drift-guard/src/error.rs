//! Error types for the drift-guard pipeline.
//!
//! Every failure in the pipeline is represented by [`PipelineError`]. Variants
//! classify the failure (see [`ErrorKind`]); the [`ErrorContext`] extension
//! trait wraps any error with a description of what the pipeline was doing,
//! keeping the original cause reachable through [`std::error::Error::source`].
//! Nothing in the crate recovers from an error: it is wrapped and propagated
//! to the caller, and the binary aborts the run.

use std::fmt;
use thiserror::Error;

/// Boxed underlying cause carried by several variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The error type for the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reading or writing a file failed.
    #[error("IO error: {message}")]
    Io {
        /// What was being read or written
        message: String,
        /// Underlying error, if any
        #[source]
        source: Option<BoxedSource>,
    },

    /// A configuration value or the schema file is missing or malformed.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Detailed error message
        message: String,
        /// Underlying error, if any
        #[source]
        source: Option<BoxedSource>,
    },

    /// Partitions do not have the shape the operation expects.
    #[error("Data shape error: {0}")]
    DataShape(String),

    /// A column of the base partition is missing from another partition.
    #[error("Column '{column}' not found in partition '{partition}'")]
    ColumnNotFound { column: String, partition: String },

    /// A column has incompatible types across partitions.
    #[error("Type mismatch for column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// The statistical test could not be computed for a column.
    #[error("Statistical test failed for column '{column}': {message}")]
    Statistics { column: String, message: String },

    /// Serializing an artifact failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from DataFusion while reading a partition.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow while reshaping or writing a partition.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Another error, annotated with what the pipeline was doing.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    Configuration,
    DataShape,
    Statistics,
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Io => "io",
            ErrorKind::Configuration => "configuration",
            ErrorKind::DataShape => "data_shape",
            ErrorKind::Statistics => "statistics",
            ErrorKind::Serialization => "serialization",
        };
        f.write_str(name)
    }
}

/// A type alias for `Result<T, PipelineError>`.
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Creates an I/O error without an underlying cause.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an I/O error wrapping the underlying cause.
    pub fn io_with_source(
        message: impl Into<String>,
        source: impl Into<BoxedSource>,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error wrapping the underlying cause.
    pub fn configuration_with_source(
        message: impl Into<String>,
        source: impl Into<BoxedSource>,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a statistics error for a column.
    pub fn statistics(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Statistics {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Returns the kind of this error, looking through context layers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::DataFusion(_) | Self::Arrow(_) => ErrorKind::Io,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::DataShape(_) | Self::ColumnNotFound { .. } | Self::TypeMismatch { .. } => {
                ErrorKind::DataShape
            }
            Self::Statistics { .. } => ErrorKind::Statistics,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Context { source, .. } => source.kind(),
        }
    }

    /// Returns the innermost error, skipping context layers.
    pub fn root(&self) -> &PipelineError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::io_with_source(err.to_string(), err)
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<PipelineError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| PipelineError::Context {
            context: msg.to_string(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| PipelineError::Context {
            context: f(),
            source: Box::new(e.into()),
        })
    }
}
