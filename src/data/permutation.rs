//! Reordering objects through the swap primitive.
//!
//! Every ordering operation (sort, shuffle, reverse) computes a desired order
//! of object indexes and then realizes it with [`DataSet::swap_objects`] only,
//! so it works identically for dense stores and for views (where a swap just
//! exchanges two index list entries).
//!
//! # Algorithm
//!
//! [`apply_permutation`] follows cycles in place with `O(n)` swaps and an
//! `O(n)` scratch index array. After position `i` is filled, `idx[i]` records
//! where the object that used to sit at `i` was moved to. When the desired
//! source for a later position points below the current position, the chain
//! `idx[src]` is followed until it reaches a slot that has not been filled
//! yet, which is where that object lives now.

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;

use super::options::{SortKey, SortOptions};
use super::traits::DataSet;

/// `[0, 1, ..., n - 1]`.
#[inline]
pub fn identity(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// Reorder `dataset` so that the object at position `i` afterwards is the one
/// that was at position `order[i]` before.
///
/// `order` must be a permutation of `0..dataset.n_objects()`; anything else
/// produces an unspecified order (checked only in debug builds).
pub fn apply_permutation<D: DataSet + ?Sized>(dataset: &mut D, order: &[usize]) {
    debug_assert_eq!(order.len(), dataset.n_objects());
    debug_assert!(is_permutation(order), "order must be a permutation");
    tracing::trace!(n = order.len(), "applying permutation");

    let mut idx = order.to_vec();
    for i in 0..idx.len() {
        let mut source = idx[i];
        while source < i {
            source = idx[source];
        }
        dataset.swap_objects(i, source);
        idx[i] = source;
    }
}

/// Reverse the order of objects with a two-pointer swap walk.
pub fn reverse<D: DataSet + ?Sized>(dataset: &mut D) {
    let n = dataset.n_objects();
    if n < 2 {
        return;
    }
    let (mut i, mut j) = (0, n - 1);
    while i < j {
        dataset.swap_objects(i, j);
        i += 1;
        j -= 1;
    }
}

/// A uniformly random permutation of `0..n`.
pub fn random_order<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order = identity(n);
    order.shuffle(rng);
    order
}

/// The order that sorts `dataset` as described by `options`.
///
/// Keys are read once per object. Missing feature values are placed after all
/// present values in both directions.
pub fn sort_order<D: DataSet + ?Sized>(dataset: &D, options: &SortOptions) -> Vec<usize> {
    let n = dataset.n_objects();
    let keys: Vec<f64> = match options.key {
        SortKey::Feature(feature) => (0..n).map(|i| dataset.feature(i, feature)).collect(),
        SortKey::Weight => (0..n).map(|i| dataset.weight(i)).collect(),
        // Refusal sorts before class 0.
        SortKey::Target => (0..n)
            .map(|i| dataset.target(i).map_or(-1.0, |c| c as f64))
            .collect(),
    };
    tracing::trace!(n, key = ?options.key, reverse = options.reverse, "computing sort order");

    let compare = |&a: &usize, &b: &usize| compare_keys(keys[a], keys[b], options.reverse);
    let mut order = identity(n);
    if options.stable {
        order.sort_by(compare);
    } else {
        order.sort_unstable_by(compare);
    }
    order
}

fn compare_keys(a: f64, b: f64, reverse: bool) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if reverse => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn is_permutation(order: &[usize]) -> bool {
    let mut seen = vec![false; order.len()];
    for &i in order {
        if i >= seen.len() || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}
