//! Configuration for object reordering.

use bon::Builder;

/// Key used to order objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Value of the feature at this (visible) index. Missing values sort last.
    Feature(usize),
    /// Object weight.
    Weight,
    /// Target class; refusals sort before every class.
    #[default]
    Target,
}

/// Options for [`DataSet::sort_objects`](super::DataSet::sort_objects).
///
/// The relative order of objects with equal keys is unspecified unless
/// `stable` is set.
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
pub struct SortOptions {
    /// What to sort by.
    pub key: SortKey,
    /// Sort descending instead of ascending (default: false).
    #[builder(default)]
    pub reverse: bool,
    /// Keep equal keys in their current relative order (default: false).
    #[builder(default)]
    pub stable: bool,
}

impl SortOptions {
    /// Ascending, unstable sort by `key`.
    pub fn by(key: SortKey) -> Self {
        Self::builder().key(key).build()
    }
}

impl Default for SortOptions {
    fn default() -> Self {
        Self::by(SortKey::default())
    }
}

/// Options for [`DataSet::shuffle_with`](super::DataSet::shuffle_with).
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
pub struct ShuffleOptions {
    /// Seed for the deterministic generator (default: 42).
    #[builder(default = 42)]
    pub seed: u64,
}

impl Default for ShuffleOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let sort = SortOptions::default();
        assert_eq!(sort.key, SortKey::Target);
        assert!(!sort.reverse);
        assert!(!sort.stable);

        assert_eq!(ShuffleOptions::default().seed, 42);
    }

    #[test]
    fn test_builder_pattern() {
        let sort = SortOptions::builder()
            .key(SortKey::Feature(3))
            .reverse(true)
            .stable(true)
            .build();
        assert_eq!(sort.key, SortKey::Feature(3));
        assert!(sort.reverse);
        assert!(sort.stable);

        let shuffle = ShuffleOptions::builder().seed(7).build();
        assert_eq!(shuffle.seed, 7);
    }
}
