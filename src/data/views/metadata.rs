//! Feature-restricting view over metadata.

use std::fmt;
use std::rc::Rc;

use super::{validate_indexes, IndexList};
use crate::data::error::DatasetError;
use crate::data::schema::FeatureMeta;
use crate::data::traits::Metadata;

/// Metadata with a possibly restricted and reordered feature set.
///
/// Only the feature axis is projected. The name, target descriptor and
/// penalties always come from the wrapped metadata unchanged.
///
/// # Example
///
/// ```
/// use mll_data::data::{Metadata, MetadataView, Schema};
///
/// let schema = Schema::all_numeric(4, 2);
/// let mut view = MetadataView::new(&schema);
/// view.set_feature_indexes([3, 1]).unwrap();
///
/// assert_eq!(view.n_features(), 2);
/// assert_eq!(view.feature(0).name, "f3");
/// assert_eq!(view.n_classes(), 2);
/// ```
#[derive(Clone)]
pub struct MetadataView<'a> {
    metadata: &'a dyn Metadata,
    features: Option<IndexList>,
}

impl<'a> MetadataView<'a> {
    /// Wrap metadata without restricting anything.
    pub fn new(metadata: &'a dyn Metadata) -> Self {
        Self {
            metadata,
            features: None,
        }
    }

    /// The wrapped metadata.
    pub fn inner(&self) -> &'a dyn Metadata {
        self.metadata
    }

    /// Show only the given features, in the given order.
    ///
    /// # Errors
    ///
    /// Fails without changing the view if any index is not a feature of the
    /// wrapped metadata.
    pub fn set_feature_indexes<I>(&mut self, indexes: I) -> Result<(), DatasetError>
    where
        I: IntoIterator<Item = usize>,
    {
        self.set_feature_indexes_shared(Rc::new(indexes.into_iter().collect()))
    }

    /// Like [`set_feature_indexes`](Self::set_feature_indexes), sharing an existing list.
    pub fn set_feature_indexes_shared(&mut self, indexes: IndexList) -> Result<(), DatasetError> {
        let n_features = self.metadata.n_features();
        validate_indexes(&indexes, n_features, |index| {
            DatasetError::FeatureIndexOutOfRange { index, n_features }
        })?;
        self.features = Some(indexes);
        Ok(())
    }

    /// The active feature list, if any.
    pub fn feature_indexes(&self) -> Option<&IndexList> {
        self.features.as_ref()
    }

    /// Returns true if the feature set is restricted.
    #[inline]
    pub fn has_feature_indexes(&self) -> bool {
        self.features.is_some()
    }

    /// Index in the wrapped metadata of visible feature `index`.
    ///
    /// # Panics
    ///
    /// Panics if a feature list is active and `index` is beyond it.
    #[inline]
    pub fn actual_feature_index(&self, index: usize) -> usize {
        match &self.features {
            Some(list) => list[index],
            None => index,
        }
    }

    /// Drop the feature list.
    pub fn reset(&mut self) {
        self.features = None;
    }
}

impl Metadata for MetadataView<'_> {
    fn name(&self) -> &str {
        self.metadata.name()
    }

    fn n_features(&self) -> usize {
        match &self.features {
            Some(list) => list.len(),
            None => self.metadata.n_features(),
        }
    }

    fn feature(&self, index: usize) -> &FeatureMeta {
        self.metadata.feature(self.actual_feature_index(index))
    }

    fn target(&self) -> &FeatureMeta {
        self.metadata.target()
    }

    fn penalty(&self, actual: usize, predicted: Option<usize>) -> f64 {
        self.metadata.penalty(actual, predicted)
    }
}

impl fmt::Debug for MetadataView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataView")
            .field("name", &self.metadata.name())
            .field("features", &self.features)
            .finish()
    }
}
