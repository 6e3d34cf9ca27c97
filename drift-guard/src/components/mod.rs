//! The two stages of the training pipeline.

mod ingestion;
mod validation;

pub use ingestion::{split_indices, store_from_config, DataIngestion, SplitIndices};
pub use validation::DataValidation;
