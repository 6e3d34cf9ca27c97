//! Distribution drift between a base and a current partition.
//!
//! Every column of the base partition is compared with the same column of the
//! current partition using a two-sample Kolmogorov–Smirnov test. A column is
//! considered stable only when its p-value is strictly above the threshold.

use crate::partition::{Partition, Sample};
use crate::prelude::*;
use tracing::{debug, info, instrument, warn};

pub mod ks;
mod report;

pub use ks::{KsMethod, KsTest};
pub use report::{ColumnDrift, DriftReport};

/// Returns `true` when `p_value` does not clear `threshold`.
///
/// A p-value equal to the threshold counts as drift.
pub fn is_drift(p_value: f64, threshold: f64) -> bool {
    !(threshold < p_value)
}

/// Runs the KS test on one column's samples.
pub fn compare_samples(column: &str, base: Sample, current: Sample) -> Result<KsTest> {
    let (base_type, current_type) = (base.type_name(), current.type_name());
    let result = match (base, current) {
        (Sample::Numeric(a), Sample::Numeric(b)) => ks::two_sample_f64(a, b),
        (Sample::Text(a), Sample::Text(b)) => ks::two_sample(a, b, Ord::cmp),
        _ => {
            return Err(PipelineError::TypeMismatch {
                column: column.to_string(),
                expected: base_type.to_string(),
                found: current_type.to_string(),
            })
        }
    };
    result.ok_or_else(|| {
        PipelineError::statistics(column, "sample has no non-null values in one of the partitions")
    })
}

/// Compares partitions column by column.
///
/// # Examples
///
/// ```rust
/// use drift_guard::drift::DriftDetector;
///
/// let detector = DriftDetector::new(0.05);
/// assert_eq!(detector.threshold(), 0.05);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftDetector {
    threshold: f64,
}

impl Default for DriftDetector {
    fn default() -> Self {
        Self::new(crate::config::DATA_VALIDATION_DRIFT_THRESHOLD)
    }
}

impl DriftDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Tests every column of `base` against `current`, in `base` column order.
    ///
    /// Fails without a partial report if a column is missing from `current`,
    /// has a different kind of values, or has no values in either partition.
    #[instrument(skip_all, fields(base = base.name(), current = current.name(), threshold = self.threshold))]
    pub fn detect(&self, base: &Partition, current: &Partition) -> Result<DriftReport> {
        let mut report = DriftReport::new();

        for column in base.column_names() {
            let base_sample = base.sample(&column)?;
            let current_sample = current.sample(&column)?;
            let (base_size, current_size) = (base_sample.len(), current_sample.len());

            let test = compare_samples(&column, base_sample, current_sample)?;
            let drift_detected = is_drift(test.p_value, self.threshold);

            if drift_detected {
                warn!(
                    column = %column,
                    p_value = test.p_value,
                    statistic = test.statistic,
                    "Drift detected"
                );
            } else {
                debug!(
                    column = %column,
                    p_value = test.p_value,
                    statistic = test.statistic,
                    base_size,
                    current_size,
                    method = ?test.method,
                    "Column is stable"
                );
            }

            report.record(
                column,
                ColumnDrift {
                    p_value: test.p_value,
                    statistic: test.statistic,
                    drift_detected,
                },
            );
        }

        info!(
            columns = report.len(),
            drifted = report.drifted_columns().len(),
            status = report.status(),
            "Drift detection complete"
        );
        Ok(report)
    }
}
