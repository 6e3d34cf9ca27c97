//! Schema conformance constraints evaluated against a partition.

use crate::partition::Partition;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

mod column_count;

pub use column_count::ColumnCountConstraint;

/// The status of a constraint evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintStatus {
    /// The constraint check passed
    Success,
    /// The constraint check failed
    Failure,
}

impl ConstraintStatus {
    /// Returns true if this is a Success status.
    pub fn is_success(&self) -> bool {
        matches!(self, ConstraintStatus::Success)
    }

    /// Returns true if this is a Failure status.
    pub fn is_failure(&self) -> bool {
        matches!(self, ConstraintStatus::Failure)
    }
}

/// The result of evaluating a constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintResult {
    /// The status of the constraint evaluation
    pub status: ConstraintStatus,
    /// Optional metric value computed during evaluation
    pub metric: Option<f64>,
    /// Optional message providing additional context
    pub message: Option<String>,
}

impl ConstraintResult {
    /// Creates a successful constraint result with a metric.
    pub fn success_with_metric(metric: f64) -> Self {
        Self {
            status: ConstraintStatus::Success,
            metric: Some(metric),
            message: None,
        }
    }

    /// Creates a failed constraint result with a metric.
    pub fn failure_with_metric(metric: f64, message: impl Into<String>) -> Self {
        Self {
            status: ConstraintStatus::Failure,
            metric: Some(metric),
            message: Some(message.into()),
        }
    }
}

/// A validation rule over a whole partition.
///
/// Evaluation is pure: it reads the partition and returns a result without
/// side effects.
pub trait Constraint: Debug + Send + Sync {
    /// Evaluates the constraint against `partition`.
    fn evaluate(&self, partition: &Partition) -> ConstraintResult;

    /// Returns the name of this constraint.
    fn name(&self) -> &str;
}
