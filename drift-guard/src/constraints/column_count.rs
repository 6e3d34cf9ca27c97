//! Column count validation constraint.

use super::{Constraint, ConstraintResult};
use crate::partition::Partition;
use crate::schema::SchemaDefinition;
use tracing::{debug, instrument};

/// A constraint that checks a partition has exactly the expected number of columns.
///
/// Only the cardinality is compared: a partition with the right number of
/// columns passes even if the columns are renamed, reordered, or swapped for
/// unrelated ones.
///
/// # Examples
///
/// ```rust
/// use drift_guard::constraints::{ColumnCountConstraint, Constraint};
///
/// let constraint = ColumnCountConstraint::new(31);
/// assert_eq!(constraint.name(), "column_count");
/// assert_eq!(constraint.expected(), 31);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnCountConstraint {
    expected: usize,
}

impl ColumnCountConstraint {
    /// Creates a new column count constraint.
    pub fn new(expected: usize) -> Self {
        Self { expected }
    }

    /// Expects as many columns as `schema` declares.
    pub fn for_schema(schema: &SchemaDefinition) -> Self {
        Self::new(schema.len())
    }

    pub fn expected(&self) -> usize {
        self.expected
    }
}

impl Constraint for ColumnCountConstraint {
    #[instrument(skip(self, partition), fields(partition_name = partition.name(), expected = self.expected))]
    fn evaluate(&self, partition: &Partition) -> ConstraintResult {
        let column_count = partition.num_columns();
        debug!(column_count, "Counted partition columns");

        if column_count == self.expected {
            ConstraintResult::success_with_metric(column_count as f64)
        } else {
            ConstraintResult::failure_with_metric(
                column_count as f64,
                format!(
                    "Partition '{}' has {column_count} columns, schema requires {}",
                    partition.name(),
                    self.expected
                ),
            )
        }
    }

    fn name(&self) -> &str {
        "column_count"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintStatus;
    use arrow::array::{ArrayRef, Int64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    fn partition_with_columns(num_columns: usize) -> Partition {
        let fields: Vec<Field> = (0..num_columns)
            .map(|i| Field::new(format!("col_{i}"), DataType::Int64, true))
            .collect();
        let arrays: Vec<ArrayRef> = (0..num_columns)
            .map(|_| Arc::new(Int64Array::from(vec![Some(1), Some(2), Some(3)])) as ArrayRef)
            .collect();
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap();
        Partition::new("data", batch)
    }

    #[test]
    fn test_column_count_equals() {
        let partition = partition_with_columns(5);

        let result = ColumnCountConstraint::new(5).evaluate(&partition);
        assert_eq!(result.status, ConstraintStatus::Success);
        assert_eq!(result.metric, Some(5.0));
        assert!(result.message.is_none());

        let result = ColumnCountConstraint::new(10).evaluate(&partition);
        assert_eq!(result.status, ConstraintStatus::Failure);
        assert_eq!(result.metric, Some(5.0));
        assert!(result.message.unwrap().contains("has 5 columns"));
    }

    #[test]
    fn test_extra_and_missing_columns_fail() {
        let constraint = ColumnCountConstraint::new(3);
        assert!(constraint.evaluate(&partition_with_columns(4)).status.is_failure());
        assert!(constraint.evaluate(&partition_with_columns(2)).status.is_failure());
    }

    #[test]
    fn test_names_are_not_checked() {
        // Schema declares a, b; partition has col_0, col_1.
        let schema = SchemaDefinition::from_columns([("a", "int64"), ("b", "int64")]);
        let result = ColumnCountConstraint::for_schema(&schema).evaluate(&partition_with_columns(2));
        assert!(result.status.is_success());
    }

    #[test]
    fn test_large_column_count() {
        let result = ColumnCountConstraint::new(100).evaluate(&partition_with_columns(100));
        assert!(result.status.is_success());
        assert_eq!(result.metric, Some(100.0));
    }
}
