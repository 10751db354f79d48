//! Property-based tests for datasets, views and the permutation engine.
//!
//! Datasets are generated from a seed with [`random_dataset`], so every case
//! is reproducible from the shrunk seed alone.

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

use mll_data::data::permutation::apply_permutation;
use mll_data::data::{DataSet, DatasetView, DenseDataSet, Schema, SortKey, SortOptions};
use mll_data::testing::{
    assert_same_object_multiset, assert_same_objects, random_dataset, random_permutation,
    DEFAULT_TOLERANCE,
};

// =============================================================================
// Strategies
// =============================================================================

/// `(seed, n_objects, n_features, n_classes)` for [`random_dataset`].
fn arb_shape() -> impl Strategy<Value = (u64, usize, usize, usize)> {
    (any::<u64>(), 0usize..40, 1usize..5, 1usize..5)
}

/// A dataset together with a list of in-range object indexes (repeats allowed).
fn arb_dataset_and_indexes() -> impl Strategy<Value = (DenseDataSet, Vec<usize>)> {
    arb_shape()
        .prop_filter("need objects to index", |(_, n, _, _)| *n > 0)
        .prop_flat_map(|(seed, n, f, c)| {
            (
                Just(random_dataset(seed, n, f, c)),
                prop_vec(0..n, 0..2 * n),
            )
        })
}

fn key_column<D: DataSet + ?Sized>(ds: &D, key: SortKey) -> Vec<f64> {
    (0..ds.n_objects())
        .map(|o| match key {
            SortKey::Feature(j) => ds.feature(o, j),
            SortKey::Weight => ds.weight(o),
            SortKey::Target => ds.target(o).map_or(-1.0, |c| c as f64),
        })
        .collect()
}

/// Present values are monotone and every missing value comes after them.
fn is_sorted(keys: &[f64], reverse: bool) -> bool {
    let present = keys.iter().take_while(|v| !v.is_nan()).count();
    let tail_missing = keys[present..].iter().all(|v| v.is_nan());
    let monotone = keys[..present].windows(2).all(|w| {
        if reverse {
            w[0] >= w[1]
        } else {
            w[0] <= w[1]
        }
    });
    tail_missing && monotone
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // =========================================================================
    // Projection
    // =========================================================================

    #[test]
    fn fresh_view_is_transparent((seed, n, f, c) in arb_shape()) {
        let ds = random_dataset(seed, n, f, c);
        let view = DatasetView::new(&ds);
        assert_same_objects(&view, &ds, "fresh view");
        for o in 0..n {
            for class in 0..c {
                prop_assert_eq!(view.confidence(o, class), ds.confidence(o, class));
            }
        }

        let nested = DatasetView::new(&view);
        assert_same_objects(&nested, &ds, "nested view");
    }

    #[test]
    fn object_indexes_map_positions((ds, indexes) in arb_dataset_and_indexes()) {
        let mut view = DatasetView::new(&ds);
        view.set_object_indexes(indexes.iter().copied()).unwrap();
        prop_assert_eq!(view.n_objects(), indexes.len());
        for (p, &i) in indexes.iter().enumerate() {
            prop_assert_eq!(view.target(p), ds.target(i));
            prop_assert_eq!(view.weight(p).to_bits(), ds.weight(i).to_bits());
            prop_assert_eq!(view.feature(p, 0).to_bits(), ds.feature(i, 0).to_bits());
        }
    }

    #[test]
    fn out_of_range_indexes_are_rejected((ds, mut indexes) in arb_dataset_and_indexes()) {
        let n = ds.n_objects();
        let mut view = DatasetView::new(&ds);
        indexes.push(n);
        prop_assert!(view.set_object_indexes(indexes).is_err());
        prop_assert!(!view.has_object_indexes());
        prop_assert_eq!(view.n_objects(), n);
    }

    #[test]
    fn overlay_writes_stay_private(
        (ds, indexes) in arb_dataset_and_indexes(),
        writes in prop_vec((any::<prop::sample::Index>(), 0usize..5, 0.0f64..3.0), 1..20),
    ) {
        prop_assume!(!indexes.is_empty());
        let before = ds.clone();
        let mut view = DatasetView::new(&ds);
        view.set_object_indexes(indexes.iter().copied()).unwrap();

        for (pos, class, weight) in &writes {
            let p = pos.index(indexes.len());
            view.set_target(p, Some(*class));
            view.set_weight(p, *weight);
        }
        assert_same_objects(&ds, &before, "wrapped dataset");

        view.reset_targets();
        view.reset_weights();
        for (p, &i) in indexes.iter().enumerate() {
            prop_assert_eq!(view.target(p), ds.target(i));
            prop_assert_eq!(view.weight(p).to_bits(), ds.weight(i).to_bits());
        }
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    #[test]
    fn sorting_orders_keys(
        (seed, n, f, c) in arb_shape(),
        feature in 0usize..5,
        key_kind in 0u8..3,
        reverse in any::<bool>(),
        stable in any::<bool>(),
    ) {
        let ds = random_dataset(seed, n, f, c);
        let key = match key_kind {
            0 => SortKey::Feature(feature % f),
            1 => SortKey::Weight,
            _ => SortKey::Target,
        };
        let options = SortOptions::builder().key(key).reverse(reverse).stable(stable).build();

        let mut view = DatasetView::new(&ds);
        view.sort_objects(&options);
        prop_assert!(is_sorted(&key_column(&view, key), reverse));
        assert_same_object_multiset(&view, &ds, "sorted view");

        let mut store = ds.clone();
        store.sort_objects(&options);
        prop_assert!(is_sorted(&key_column(&store, key), reverse));
        assert_same_object_multiset(&store, &ds, "sorted store");
    }

    #[test]
    fn shuffle_preserves_objects((seed, n, f, c) in arb_shape(), shuffle_seed in any::<u64>()) {
        let ds = random_dataset(seed, n, f, c);
        let mut store = ds.clone();
        store.shuffle_with(&mll_data::data::ShuffleOptions::builder().seed(shuffle_seed).build());
        assert_same_object_multiset(&store, &ds, "shuffled store");
    }

    #[test]
    fn reverse_twice_is_identity((ds, indexes) in arb_dataset_and_indexes()) {
        let mut view = DatasetView::new(&ds);
        view.set_object_indexes(indexes).unwrap();
        let before = view.materialize();
        view.reverse();
        view.reverse();
        assert_same_objects(&view, &before, "reversed twice");

        let mut store = ds.clone();
        store.reverse();
        store.reverse();
        assert_same_objects(&store, &ds, "store reversed twice");
    }

    #[test]
    fn permutation_engine_realizes_order(n in 0usize..60, seed in any::<u64>()) {
        let order = random_permutation(seed, n);
        let mut ds = DenseDataSet::with_objects(Schema::all_numeric(1, 1), n);
        for i in 0..n {
            ds.set_feature(i, 0, i as f64);
        }
        apply_permutation(&mut ds, &order);
        let got: Vec<usize> = (0..n).map(|i| ds.feature(i, 0) as usize).collect();
        prop_assert_eq!(got, order);
    }

    // =========================================================================
    // Weights
    // =========================================================================

    #[test]
    fn normalized_weights_sum_to_one((seed, n, f, c) in arb_shape()) {
        let ds = random_dataset(seed, n, f, c);
        let mut view = DatasetView::new(&ds);
        let sum = view.weight_sum();
        view.normalize_weights();
        if sum > 0.0 {
            prop_assert!((view.weight_sum() - 1.0).abs() < DEFAULT_TOLERANCE);
        } else {
            prop_assert!(!view.has_weight_overlay());
            prop_assert_eq!(view.weight_sum(), sum);
        }
    }
}
