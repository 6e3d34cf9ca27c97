//! # drift-guard - Ingestion and drift validation for training data
//!
//! drift-guard prepares a tabular dataset for model training and checks that
//! the resulting train and test partitions are fit to use. A run has two
//! stages:
//!
//! 1. **Ingestion** exports every record from a [`RecordStore`](sources::RecordStore),
//!    keeps a copy in the feature store and splits the rows into train and
//!    test partitions with a seeded shuffle.
//! 2. **Validation** checks each partition's column count against a YAML
//!    schema, then compares the distribution of every column across the two
//!    partitions with a two-sample Kolmogorov–Smirnov test and writes a
//!    per-column drift report.
//!
//! Partitions are read with DataFusion into Arrow record batches.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drift_guard::artifacts::IngestionResult;
//! use drift_guard::components::DataValidation;
//! use drift_guard::config::DataValidationConfig;
//!
//! # async fn example() -> drift_guard::prelude::Result<()> {
//! let ingestion = IngestionResult::new("ingested/train.csv", "ingested/test.csv");
//! let config = DataValidationConfig::in_dir("data_validation", "data_schema/schema.yaml");
//!
//! let result = DataValidation::new(ingestion, config)?
//!     .initiate_validation()
//!     .await?;
//!
//! if !result.validation_status {
//!     println!("drift found, see {}", result.drift_report_file_path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Drift rule
//!
//! A column is stable when its p-value is strictly greater than the threshold
//! (0.05 by default); a p-value equal to the threshold counts as drift. The
//! overall status is `false` as soon as one column drifts.
//!
//! ## Logging
//!
//! Components emit `tracing` events; see [`logging::setup`] to route them.

pub mod artifacts;
pub mod components;
pub mod config;
pub mod constraints;
pub mod drift;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod partition;
pub mod pipeline;
pub mod prelude;
pub mod schema;
pub mod sources;
