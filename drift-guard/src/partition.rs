//! In-memory tabular partitions.

use crate::prelude::*;
use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;

/// One named slice of the dataset (train or test), fully materialized.
#[derive(Debug, Clone)]
pub struct Partition {
    name: String,
    batch: RecordBatch,
}

/// The non-null values of one column, ready for a two-sample test.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// Numeric and boolean columns, as `f64`.
    Numeric(Vec<f64>),
    /// Every other column type, rendered as text.
    Text(Vec<String>),
}

impl Sample {
    pub fn len(&self) -> usize {
        match self {
            Sample::Numeric(values) => values.len(),
            Sample::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short type label used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Sample::Numeric(_) => "numeric",
            Sample::Text(_) => "text",
        }
    }
}

impl Partition {
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Column names in partition order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Extracts a column's non-null values.
    ///
    /// NaN is treated as missing, like a null.
    pub fn sample(&self, column: &str) -> Result<Sample> {
        let array = self.batch.column_by_name(column).ok_or_else(|| {
            PipelineError::ColumnNotFound {
                column: column.to_string(),
                partition: self.name.clone(),
            }
        })?;
        to_sample(column, array)
    }
}

fn is_numeric(data_type: &DataType) -> bool {
    data_type.is_numeric() || matches!(data_type, DataType::Boolean | DataType::Null)
}

fn to_sample(column: &str, array: &ArrayRef) -> Result<Sample> {
    let shape_error = |target: &str, e: arrow::error::ArrowError| {
        PipelineError::DataShape(format!(
            "column '{column}' of type {} cannot be read as {target}: {e}",
            array.data_type()
        ))
    };

    if is_numeric(array.data_type()) {
        let converted = cast(array, &DataType::Float64).map_err(|e| shape_error("f64", e))?;
        let values = converted
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| {
                PipelineError::DataShape(format!("column '{column}' did not cast to f64"))
            })?;
        Ok(Sample::Numeric(
            values.iter().flatten().filter(|v| !v.is_nan()).collect(),
        ))
    } else {
        let converted = cast(array, &DataType::Utf8).map_err(|e| shape_error("text", e))?;
        let values = converted
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                PipelineError::DataShape(format!("column '{column}' did not cast to text"))
            })?;
        Ok(Sample::Text(
            values.iter().flatten().map(str::to_string).collect(),
        ))
    }
}
