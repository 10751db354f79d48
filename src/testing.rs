//! Testing utilities for mll-data.
//!
//! This module provides common assertion helpers and dataset generators
//! that can be used in both unit tests and integration tests.
//!
//! # Usage
//!
//! ```ignore
//! use mll_data::assert_approx_eq;
//! use mll_data::testing::{random_dataset, assert_same_objects};
//! ```

use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::{DataSet, DenseDataSet, Schema};

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for floating point comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

// =============================================================================
// Floating Point Assertions
// =============================================================================

/// Assert that two f64 values are approximately equal.
///
/// Uses absolute difference comparison with the given tolerance.
///
/// # Examples
///
/// ```
/// # use mll_data::assert_approx_eq;
/// assert_approx_eq!(1.0, 1.0001, 0.001);
/// ```
///
/// # Panics
///
/// Panics if the absolute difference exceeds tolerance.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                left_val, right_val, diff, tol
            );
        }
    }};
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)` - {}\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                format_args!($($arg)+), left_val, right_val, diff, tol
            );
        }
    }};
}

// =============================================================================
// Dataset Assertions
// =============================================================================

/// Feature row of an object, for comparisons where `NAN == NAN`.
fn row_bits<D: DataSet + ?Sized>(dataset: &D, object: usize) -> Vec<u64> {
    (0..dataset.n_features())
        .map(|j| dataset.feature(object, j).to_bits())
        .collect()
}

/// Assert that two datasets expose the same objects in the same order.
///
/// Compares features (bitwise, so missing values match), targets and weights.
///
/// # Panics
///
/// Panics on the first differing object.
pub fn assert_same_objects<A, B>(actual: &A, expected: &B, context: &str)
where
    A: DataSet + ?Sized,
    B: DataSet + ?Sized,
{
    assert_eq!(
        actual.n_objects(),
        expected.n_objects(),
        "{context}: object count mismatch"
    );
    assert_eq!(
        actual.n_features(),
        expected.n_features(),
        "{context}: feature count mismatch"
    );
    for o in 0..actual.n_objects() {
        assert_eq!(
            row_bits(actual, o),
            row_bits(expected, o),
            "{context}[{o}]: features differ"
        );
        assert_eq!(
            actual.target(o),
            expected.target(o),
            "{context}[{o}]: targets differ"
        );
        assert_eq!(
            actual.weight(o).to_bits(),
            expected.weight(o).to_bits(),
            "{context}[{o}]: weights differ ({} vs {})",
            actual.weight(o),
            expected.weight(o)
        );
    }
}

/// Assert that two datasets hold the same objects, in any order.
///
/// # Panics
///
/// Panics if the multisets of (features, target, weight) differ.
pub fn assert_same_object_multiset<A, B>(actual: &A, expected: &B, context: &str)
where
    A: DataSet + ?Sized,
    B: DataSet + ?Sized,
{
    fn objects<D: DataSet + ?Sized>(ds: &D) -> Vec<(Vec<u64>, Option<usize>, u64)> {
        let mut all: Vec<_> = (0..ds.n_objects())
            .map(|o| (row_bits(ds, o), ds.target(o), ds.weight(o).to_bits()))
            .collect();
        all.sort_unstable();
        all
    }
    assert_eq!(objects(actual), objects(expected), "{context}: objects differ");
}

// =============================================================================
// Generators
// =============================================================================

/// Random dense dataset with numeric features.
///
/// Features are uniform in `[-10, 10)`, about one in ten values is missing,
/// targets are uniform over the classes (with refusal allowed and drawn about
/// one in ten times), and weights are uniform in `[0, 2)`.
pub fn random_dataset(
    seed: u64,
    n_objects: usize,
    n_features: usize,
    n_classes: usize,
) -> DenseDataSet {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut schema = Schema::all_numeric(n_features, n_classes);
    schema.set_allow_refuse(true);

    let mut ds = DenseDataSet::with_objects(schema, n_objects);
    for o in 0..n_objects {
        for j in 0..n_features {
            let value = if rng.gen_bool(0.1) {
                f64::NAN
            } else {
                rng.gen_range(-10.0..10.0)
            };
            ds.set_feature(o, j, value);
        }
        let target = if n_classes == 0 || rng.gen_bool(0.1) {
            None
        } else {
            Some(rng.gen_range(0..n_classes))
        };
        ds.set_target(o, target);
        ds.set_weight(o, rng.gen_range(0.0..2.0));
    }
    ds
}

/// Deterministic random permutation of `0..n`.
pub fn random_permutation(seed: u64, n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut Xoshiro256PlusPlus::seed_from_u64(seed));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DatasetView;

    #[test]
    fn test_assert_approx_eq_macro() {
        assert_approx_eq!(1.0, 1.0001, 0.001);
        assert_approx_eq!(0.1 + 0.2, 0.3, DEFAULT_TOLERANCE);
        assert_approx_eq!(-1.5, -1.5001, 0.001, "testing value");
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.0, 2.0, 0.1);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails_on_nan() {
        assert_approx_eq!(f64::NAN, 1.0, 0.1);
    }

    #[test]
    fn random_dataset_is_deterministic() {
        let a = random_dataset(7, 20, 3, 4);
        let b = random_dataset(7, 20, 3, 4);
        assert_same_objects(&a, &b, "same seed");
        assert_eq!(a.n_classes(), 4);
        assert!((0..20).all(|o| a.weight(o) >= 0.0));
    }

    #[test]
    fn multiset_ignores_order() {
        let ds = random_dataset(3, 10, 2, 3);
        let mut view = DatasetView::new(&ds);
        view.reverse();
        assert_same_object_multiset(&view, &ds, "reversed");
    }

    #[test]
    fn random_permutation_is_a_permutation() {
        let mut order = random_permutation(1, 50);
        order.sort_unstable();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }
}
