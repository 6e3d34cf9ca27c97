//! Property-based tests for column counting, the KS test and the split.

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use drift_guard::components::split_indices;
use drift_guard::constraints::{ColumnCountConstraint, Constraint};
use drift_guard::drift::{compare_samples, is_drift, ks, DriftDetector};
use drift_guard::partition::{Partition, Sample};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

fn partition(columns: usize, rows: usize) -> Partition {
    let fields: Vec<Field> = (0..columns)
        .map(|i| Field::new(format!("c{i}"), DataType::Float64, true))
        .collect();
    let arrays: Vec<ArrayRef> = (0..columns)
        .map(|c| {
            Arc::new(Float64Array::from(
                (0..rows).map(|r| (r * (c + 1)) as f64).collect::<Vec<_>>(),
            )) as ArrayRef
        })
        .collect();
    Partition::new(
        "p",
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap(),
    )
}

fn finite_sample() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1_000.0f64..1_000.0, 1..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn column_count_matches_cardinality(columns in 1usize..40, expected in 0usize..40) {
        let result = ColumnCountConstraint::new(expected).evaluate(&partition(columns, 3));
        prop_assert_eq!(result.status.is_success(), columns == expected);
    }

    #[test]
    fn p_value_and_statistic_are_bounded(a in finite_sample(), b in finite_sample()) {
        let test = ks::two_sample_f64(a, b).unwrap();
        prop_assert!((0.0..=1.0).contains(&test.p_value));
        prop_assert!((0.0..=1.0).contains(&test.statistic));
    }

    #[test]
    fn test_is_symmetric(a in finite_sample(), b in finite_sample()) {
        let ab = ks::two_sample_f64(a.clone(), b.clone()).unwrap();
        let ba = ks::two_sample_f64(b, a).unwrap();
        prop_assert_eq!(ab.statistic, ba.statistic);
        prop_assert!((ab.p_value - ba.p_value).abs() < 1e-9);
    }

    #[test]
    fn identical_samples_never_drift(a in finite_sample()) {
        let test = compare_samples("x", Sample::Numeric(a.clone()), Sample::Numeric(a)).unwrap();
        prop_assert_eq!(test.statistic, 0.0);
        prop_assert_eq!(test.p_value, 1.0);
        prop_assert!(!is_drift(test.p_value, 0.05));
    }

    #[test]
    fn report_covers_every_base_column(columns in 1usize..12, rows in 1usize..30) {
        let base = partition(columns, rows);
        let report = DriftDetector::default().detect(&base, &base).unwrap();
        prop_assert_eq!(report.len(), columns);
        prop_assert!(report.status());
    }

    #[test]
    fn split_sizes_follow_ratio(rows in 2usize..500, ratio in 0.01f64..0.99, seed in any::<u64>()) {
        let num_test = (ratio * rows as f64).ceil() as usize;
        prop_assume!(num_test < rows);

        let split = split_indices(rows, ratio, Some(seed)).unwrap();
        prop_assert_eq!(split.test.len(), num_test);
        prop_assert_eq!(split.train.len(), rows - num_test);

        let all: BTreeSet<u64> = split.train.iter().chain(&split.test).copied().collect();
        prop_assert_eq!(all.len(), rows);
    }
}
