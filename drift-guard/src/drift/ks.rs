//! Two-sample Kolmogorov–Smirnov test.
//!
//! The statistic is computed exactly as an integer lattice distance so that
//! ties and the exact p-value agree. P-values are two-sided.

use std::cmp::Ordering;
use std::f64::consts::PI;

/// Largest sample size (of the bigger sample) that gets an exact p-value.
pub const EXACT_MAX_SAMPLE_SIZE: usize = 10_000;

/// How the p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KsMethod {
    /// Lattice path counting over all orderings of the pooled sample.
    Exact,
    /// Kolmogorov limiting distribution with Stephens' small-sample correction.
    Asymptotic,
}

/// Outcome of a two-sample KS test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsTest {
    /// Supremum distance between the two empirical CDFs, in [0, 1].
    pub statistic: f64,
    /// Two-sided p-value, in [0, 1].
    pub p_value: f64,
    pub method: KsMethod,
}

/// Runs the test on two samples ordered by `cmp`.
///
/// Returns `None` when either sample is empty.
pub fn two_sample<T, F>(mut base: Vec<T>, mut current: Vec<T>, cmp: F) -> Option<KsTest>
where
    F: Fn(&T, &T) -> Ordering,
{
    if base.is_empty() || current.is_empty() {
        return None;
    }
    base.sort_by(&cmp);
    current.sort_by(&cmp);

    let (m, n) = (base.len(), current.len());
    let gap = max_gap(&base, &current, &cmp);
    let statistic = gap as f64 / (m as f64 * n as f64);

    let (p_value, method) = if m.max(n) <= EXACT_MAX_SAMPLE_SIZE {
        (exact_p_value(m, n, gap), KsMethod::Exact)
    } else {
        (asymptotic_p_value(m, n, statistic), KsMethod::Asymptotic)
    };

    Some(KsTest {
        statistic,
        p_value,
        method,
    })
}

/// Runs the test on two numeric samples. NaN sorts after every number.
pub fn two_sample_f64(base: Vec<f64>, current: Vec<f64>) -> Option<KsTest> {
    two_sample(base, current, f64::total_cmp)
}

/// `max |i·n − j·m|` over the merged walk, where `i`, `j` count the elements of
/// each sample at or below the current value. Dividing by `m·n` gives D.
fn max_gap<T, F>(a: &[T], b: &[T], cmp: &F) -> u64
where
    F: Fn(&T, &T) -> Ordering,
{
    let (m, n) = (a.len() as u64, b.len() as u64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut gap = 0u64;

    while i < a.len() && j < b.len() {
        let pivot = if cmp(&a[i], &b[j]) == Ordering::Greater {
            &b[j]
        } else {
            &a[i]
        };
        while i < a.len() && cmp(&a[i], pivot) == Ordering::Equal {
            i += 1;
        }
        while j < b.len() && cmp(&b[j], pivot) == Ordering::Equal {
            j += 1;
        }
        gap = gap.max((i as u64 * n).abs_diff(j as u64 * m));
    }
    gap
}

/// P(D >= observed) under the null, by counting monotone lattice paths from
/// (0, 0) to (m, n) that stay strictly inside `|i·n − j·m| < gap`.
///
/// `row[j]` holds the share of all paths into (i, j) that stayed inside, so
/// values remain in [0, 1] for any sample size.
fn exact_p_value(m: usize, n: usize, gap: u64) -> f64 {
    if gap == 0 {
        return 1.0;
    }
    let inside = |i: usize, j: usize| (i as u64 * n as u64).abs_diff(j as u64 * m as u64) < gap;

    let mut row = vec![0.0f64; n + 1];
    row[0] = 1.0;
    for j in 1..=n {
        row[j] = if inside(0, j) { row[j - 1] } else { 0.0 };
    }
    for i in 1..=m {
        if !inside(i, 0) {
            row[0] = 0.0;
        }
        for j in 1..=n {
            row[j] = if inside(i, j) {
                let total = (i + j) as f64;
                row[j] * (i as f64 / total) + row[j - 1] * (j as f64 / total)
            } else {
                0.0
            };
        }
    }
    (1.0 - row[n]).clamp(0.0, 1.0)
}

fn asymptotic_p_value(m: usize, n: usize, statistic: f64) -> f64 {
    let effective = (m as f64 * n as f64) / (m + n) as f64;
    let sqrt_en = effective.sqrt();
    kolmogorov_survival((sqrt_en + 0.12 + 0.11 / sqrt_en) * statistic)
}

/// Survival function of the Kolmogorov distribution, Q(z) = P(K > z).
pub fn kolmogorov_survival(z: f64) -> f64 {
    if z < 0.042 {
        return 1.0;
    }
    let q = if z < 1.18 {
        // Jacobi theta form converges fast for small z.
        let y = (-PI * PI / (8.0 * z * z)).exp();
        let cdf = (2.0 * PI).sqrt() / z * (y + y.powi(9) + y.powi(25) + y.powi(49));
        1.0 - cdf
    } else {
        let x = (-2.0 * z * z).exp();
        2.0 * (x - x.powi(4) + x.powi(9))
    };
    q.clamp(0.0, 1.0)
}
