//! Core traits for dataset access.

use rand::RngCore;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::options::{ShuffleOptions, SortKey, SortOptions};
use super::permutation;
use super::schema::FeatureMeta;

/// Classification refusal: "no prediction" / "no label".
pub const REFUSE: Option<usize> = None;

// ============================================================================
// Metadata Trait
// ============================================================================

/// Read-only description of a dataset's features, target and loss.
///
/// Metadata is not owned by any single dataset; several views may share it.
/// Class indexes are `usize` in `0..n_classes()`; refusal is `None`.
pub trait Metadata {
    /// Dataset name.
    fn name(&self) -> &str;

    /// Number of (visible) features.
    fn n_features(&self) -> usize;

    /// Descriptor of a feature.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_features()`.
    fn feature(&self, index: usize) -> &FeatureMeta;

    /// Descriptor of the target. Its nominal values are the class labels and
    /// its `may_be_missing` flag means refusal is allowed.
    fn target(&self) -> &FeatureMeta;

    /// Cost of predicting `predicted` for an object of class `actual`.
    ///
    /// `penalty(a, None)` is the cost of refusing; it is `f64::INFINITY`
    /// when refusal is not allowed.
    ///
    /// # Panics
    ///
    /// Panics if `actual` or `predicted` is not a valid class index.
    fn penalty(&self, actual: usize, predicted: Option<usize>) -> f64;

    /// Number of classes.
    #[inline]
    fn n_classes(&self) -> usize {
        self.target().nominal_values.len()
    }

    /// Whether classification refusal is allowed.
    #[inline]
    fn allows_refuse(&self) -> bool {
        self.target().may_be_missing
    }

    /// Index of the first feature with the given name.
    fn feature_index(&self, name: &str) -> Option<usize> {
        (0..self.n_features()).find(|&i| self.feature(i).name == name)
    }
}

// ============================================================================
// DataSet Trait
// ============================================================================

/// Uniform access to a labelled, weighted table of objects.
///
/// Implemented by concrete stores ([`DenseDataSet`](super::DenseDataSet)) and
/// by views ([`DatasetView`](super::DatasetView)); consumers cannot tell them apart.
///
/// # Mutation
///
/// The only structural mutation is [`swap_objects`](Self::swap_objects). All
/// reordering helpers (sort, shuffle, reverse) are built on it, so any
/// implementation gets them for free.
///
/// Per-object setters silently ignore invalid values: a class outside
/// `0..n_classes()` or a negative (or NaN) weight leaves the object untouched.
///
/// # Missing Values
///
/// Missing feature values are `f64::NAN`.
pub trait DataSet {
    /// Metadata describing the visible features and the target.
    fn metadata(&self) -> &dyn Metadata;

    /// Number of objects.
    fn n_objects(&self) -> usize;

    /// Value of `feature` for `object`, `NAN` if missing.
    fn feature(&self, object: usize, feature: usize) -> f64;

    /// Returns false if the feature value for the object is missing.
    #[inline]
    fn has_feature(&self, object: usize, feature: usize) -> bool {
        !self.feature(object, feature).is_nan()
    }

    /// Target class of the object, `None` for refusal.
    fn target(&self, object: usize) -> Option<usize>;

    /// Weight of the object (1.0 unless set).
    fn weight(&self, object: usize) -> f64;

    /// Returns true if the dataset stores a soft label matrix.
    fn has_confidences(&self) -> bool {
        false
    }

    /// Confidence that `object` belongs to `class`.
    ///
    /// Without a confidence matrix this is one-hot on the target, or uniform
    /// over classes if the target is a refusal.
    fn confidence(&self, object: usize, class: usize) -> f64 {
        default_confidence(self.target(object), class, self.n_classes())
    }

    /// Set the target of an object. Ignored unless `target` is a valid class or `None`.
    fn set_target(&mut self, object: usize, target: Option<usize>);

    /// Set the weight of an object. Ignored unless `weight >= 0`.
    fn set_weight(&mut self, object: usize, weight: f64);

    /// Swap two objects.
    fn swap_objects(&mut self, a: usize, b: usize);

    // ------------------------------------------------------------------------
    // Derived helpers
    // ------------------------------------------------------------------------

    /// Dataset name.
    #[inline]
    fn name(&self) -> &str {
        self.metadata().name()
    }

    /// Number of features.
    #[inline]
    fn n_features(&self) -> usize {
        self.metadata().n_features()
    }

    /// Number of classes.
    #[inline]
    fn n_classes(&self) -> usize {
        self.metadata().n_classes()
    }

    /// Whether `target` may be stored: a valid class index or refusal.
    #[inline]
    fn is_valid_target(&self, target: Option<usize>) -> bool {
        target.map_or(true, |class| class < self.n_classes())
    }

    /// Sum of all object weights.
    fn weight_sum(&self) -> f64 {
        (0..self.n_objects()).map(|i| self.weight(i)).sum()
    }

    /// Rescale weights so they sum to 1. No-op if the sum is zero.
    fn normalize_weights(&mut self) {
        let sum = self.weight_sum();
        if sum == 0.0 {
            return;
        }
        for i in 0..self.n_objects() {
            let w = self.weight(i);
            self.set_weight(i, w / sum);
        }
    }

    /// Reverse the order of all objects.
    fn reverse(&mut self) {
        permutation::reverse(self);
    }

    /// Shuffle objects uniformly at random.
    fn shuffle(&mut self, rng: &mut dyn RngCore) {
        let order = permutation::random_order(self.n_objects(), rng);
        permutation::apply_permutation(self, &order);
    }

    /// Shuffle objects with a deterministic, seeded generator.
    fn shuffle_with(&mut self, options: &ShuffleOptions) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(options.seed);
        self.shuffle(&mut rng);
    }

    /// Sort objects as described by `options`.
    fn sort_objects(&mut self, options: &SortOptions) {
        let order = permutation::sort_order(&*self, options);
        permutation::apply_permutation(self, &order);
    }

    /// Sort objects by a feature value.
    fn sort_by_feature(&mut self, feature: usize, reverse: bool) {
        self.sort_objects(
            &SortOptions::builder()
                .key(SortKey::Feature(feature))
                .reverse(reverse)
                .build(),
        );
    }

    /// Sort objects by weight.
    fn sort_by_weight(&mut self, reverse: bool) {
        self.sort_objects(
            &SortOptions::builder()
                .key(SortKey::Weight)
                .reverse(reverse)
                .build(),
        );
    }

    /// Sort objects by target class.
    fn sort_by_target(&mut self, reverse: bool) {
        self.sort_objects(
            &SortOptions::builder()
                .key(SortKey::Target)
                .reverse(reverse)
                .build(),
        );
    }
}

/// Confidence implied by a hard label.
///
/// One-hot on `target`, or `1 / n_classes` for every class when the target is
/// a refusal.
#[inline]
pub fn default_confidence(target: Option<usize>, class: usize, n_classes: usize) -> f64 {
    match target {
        Some(t) if t == class => 1.0,
        Some(_) => 0.0,
        None if n_classes > 0 => 1.0 / n_classes as f64,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_one_hot_on_target() {
        assert_eq!(default_confidence(Some(1), 1, 3), 1.0);
        assert_eq!(default_confidence(Some(1), 0, 3), 0.0);
    }

    #[test]
    fn confidence_is_uniform_on_refusal() {
        assert_eq!(default_confidence(REFUSE, 0, 4), 0.25);
        assert_eq!(default_confidence(REFUSE, 0, 0), 0.0);
    }
}
