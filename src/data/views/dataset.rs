//! Composable dataset view.

use std::fmt;
use std::rc::Rc;

use super::{validate_indexes, IndexList, MetadataView};
use crate::data::dense::DenseDataSet;
use crate::data::error::DatasetError;
use crate::data::overlay::Overlay;
use crate::data::permutation::identity;
use crate::data::traits::{default_confidence, DataSet, Metadata};

/// A restricted, reordered or relabelled presentation of a dataset.
///
/// The view borrows the wrapped dataset and never writes to it. Its state is
/// four independent switches:
///
/// - **object indexes**: which objects are visible, in which order
/// - **feature indexes**: which features are visible (through a [`MetadataView`])
/// - **target overlay**: private copy of visible targets, created on first write
/// - **weight overlay**: private copy of visible weights, created on first write
///
/// Overlays are keyed by visible position. They are dropped whenever the
/// object index list is replaced or reset, since positions change meaning.
///
/// # Example
///
/// ```
/// use mll_data::data::{DataSet, DatasetView, DenseDataSet, Schema};
///
/// let mut ds = DenseDataSet::with_objects(Schema::all_numeric(2, 2), 4);
/// for i in 0..4 {
///     ds.set_feature(i, 0, i as f64);
/// }
///
/// let mut view = DatasetView::new(&ds);
/// view.set_object_indexes([3, 1]).unwrap();
/// view.set_target(0, Some(1));
///
/// assert_eq!(view.n_objects(), 2);
/// assert_eq!(view.feature(0, 0), 3.0);
/// assert_eq!(view.target(0), Some(1));
/// assert_eq!(ds.target(3), Some(0));
/// ```
pub struct DatasetView<'a, D: DataSet + ?Sized> {
    dataset: &'a D,
    custom_metadata: Option<&'a dyn Metadata>,
    metadata: Option<MetadataView<'a>>,
    objects: Option<IndexList>,
    targets: Overlay<Option<usize>>,
    weights: Overlay<f64>,
}

impl<'a, D: DataSet + ?Sized> DatasetView<'a, D> {
    /// Wrap a dataset. The view starts as a pure pass-through.
    pub fn new(dataset: &'a D) -> Self {
        Self {
            dataset,
            custom_metadata: None,
            metadata: None,
            objects: None,
            targets: Overlay::new(),
            weights: Overlay::new(),
        }
    }

    /// Wrap a dataset that may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MissingDataset`] if `dataset` is `None`.
    pub fn try_new(dataset: Option<&'a D>) -> Result<Self, DatasetError> {
        dataset.map(Self::new).ok_or(DatasetError::MissingDataset)
    }

    /// The wrapped dataset.
    pub fn inner(&self) -> &'a D {
        self.dataset
    }

    /// Copy the visible state into an independent dense store.
    pub fn materialize(&self) -> DenseDataSet {
        DenseDataSet::from_dataset(self)
    }

    // =========================================================================
    // Object indexes
    // =========================================================================

    /// Show only the given objects, in the given order.
    ///
    /// Indexes refer to the wrapped dataset and may repeat. Drops any target
    /// or weight overlay.
    ///
    /// # Errors
    ///
    /// Fails without changing the view if any index is not an object of the
    /// wrapped dataset.
    pub fn set_object_indexes<I>(&mut self, indexes: I) -> Result<(), DatasetError>
    where
        I: IntoIterator<Item = usize>,
    {
        self.set_object_indexes_shared(Rc::new(indexes.into_iter().collect()))
    }

    /// Like [`set_object_indexes`](Self::set_object_indexes), sharing an existing list.
    pub fn set_object_indexes_shared(&mut self, indexes: IndexList) -> Result<(), DatasetError> {
        let n_objects = self.dataset.n_objects();
        validate_indexes(&indexes, n_objects, |index| {
            DatasetError::ObjectIndexOutOfRange { index, n_objects }
        })?;
        tracing::debug!(len = indexes.len(), n_objects, "installing object indexes");
        self.objects = Some(indexes);
        self.drop_overlays();
        Ok(())
    }

    /// Show all objects in their original order. Drops any target or weight overlay.
    pub fn reset_object_indexes(&mut self) {
        if self.objects.take().is_some() {
            tracing::debug!("object indexes reset");
        }
        self.drop_overlays();
    }

    /// The active object list, if any.
    pub fn object_indexes(&self) -> Option<&IndexList> {
        self.objects.as_ref()
    }

    /// Returns true if objects are restricted or reordered.
    #[inline]
    pub fn has_object_indexes(&self) -> bool {
        self.objects.is_some()
    }

    /// Index in the wrapped dataset of visible object `object`.
    #[inline]
    pub fn actual_object_index(&self, object: usize) -> usize {
        match &self.objects {
            Some(list) => list[object],
            None => object,
        }
    }

    // =========================================================================
    // Feature indexes and metadata
    // =========================================================================

    /// Show only the given features, in the given order.
    ///
    /// # Errors
    ///
    /// Fails without changing the view if any index is not a feature of the
    /// current base metadata (custom metadata if set, else the wrapped dataset's).
    pub fn set_feature_indexes<I>(&mut self, indexes: I) -> Result<(), DatasetError>
    where
        I: IntoIterator<Item = usize>,
    {
        self.set_feature_indexes_shared(Rc::new(indexes.into_iter().collect()))
    }

    /// Like [`set_feature_indexes`](Self::set_feature_indexes), sharing an existing list.
    pub fn set_feature_indexes_shared(&mut self, indexes: IndexList) -> Result<(), DatasetError> {
        let mut view = self
            .metadata
            .clone()
            .unwrap_or_else(|| MetadataView::new(self.base_metadata()));
        let len = indexes.len();
        view.set_feature_indexes_shared(indexes)?;
        tracing::debug!(len, "installing feature indexes");
        self.metadata = Some(view);
        Ok(())
    }

    /// Show all features of the base metadata.
    pub fn reset_feature_indexes(&mut self) {
        if let Some(view) = self.metadata.as_mut() {
            view.reset();
            tracing::debug!("feature indexes reset");
        }
        if self.custom_metadata.is_none() {
            self.metadata = None;
        }
    }

    /// The active feature list, if any.
    pub fn feature_indexes(&self) -> Option<&IndexList> {
        self.metadata.as_ref().and_then(MetadataView::feature_indexes)
    }

    /// Returns true if features are restricted or reordered.
    #[inline]
    pub fn has_feature_indexes(&self) -> bool {
        self.feature_indexes().is_some()
    }

    /// Index in the wrapped dataset of visible feature `feature`.
    #[inline]
    pub fn actual_feature_index(&self, feature: usize) -> usize {
        match &self.metadata {
            Some(view) => view.actual_feature_index(feature),
            None => feature,
        }
    }

    /// Present `metadata` instead of the wrapped dataset's (e.g. to change
    /// names or penalties). Active feature indexes are re-applied to it.
    ///
    /// # Errors
    ///
    /// Fails without changing the view if the active feature indexes are out
    /// of range for `metadata`.
    pub fn set_metadata(&mut self, metadata: &'a dyn Metadata) -> Result<(), DatasetError> {
        let view = Self::rebuild_metadata(metadata, self.feature_indexes())?;
        tracing::debug!(name = metadata.name(), "custom metadata installed");
        self.custom_metadata = Some(metadata);
        self.metadata = Some(view);
        Ok(())
    }

    /// Go back to the wrapped dataset's metadata, keeping feature indexes.
    ///
    /// # Errors
    ///
    /// Fails without changing the view if the active feature indexes are out
    /// of range for the wrapped dataset's metadata.
    pub fn reset_metadata(&mut self) -> Result<(), DatasetError> {
        if self.custom_metadata.is_none() {
            return Ok(());
        }
        let indexes = self.feature_indexes().cloned();
        let view = match indexes {
            Some(list) => Some(Self::rebuild_metadata(
                self.dataset.metadata(),
                Some(&list),
            )?),
            None => None,
        };
        tracing::debug!("custom metadata reset");
        self.custom_metadata = None;
        self.metadata = view;
        Ok(())
    }

    /// Returns true if custom metadata replaces the wrapped dataset's.
    #[inline]
    pub fn has_custom_metadata(&self) -> bool {
        self.custom_metadata.is_some()
    }

    // =========================================================================
    // Overlays
    // =========================================================================

    /// Returns true once targets have been written through this view.
    #[inline]
    pub fn has_target_overlay(&self) -> bool {
        self.targets.is_active()
    }

    /// Returns true once weights have been written through this view.
    #[inline]
    pub fn has_weight_overlay(&self) -> bool {
        self.weights.is_active()
    }

    /// Drop target overrides; targets read through to the wrapped dataset again.
    pub fn reset_targets(&mut self) {
        self.targets.reset();
    }

    /// Drop weight overrides; weights read through to the wrapped dataset again.
    pub fn reset_weights(&mut self) {
        self.weights.reset();
    }

    /// Drop all view state, reverting to a pure pass-through.
    pub fn reset(&mut self) {
        self.custom_metadata = None;
        self.metadata = None;
        self.objects = None;
        self.drop_overlays();
        tracing::debug!("view reset");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn base_metadata(&self) -> &'a dyn Metadata {
        let dataset: &'a D = self.dataset;
        self.custom_metadata.unwrap_or_else(|| dataset.metadata())
    }

    fn rebuild_metadata(
        metadata: &'a dyn Metadata,
        indexes: Option<&IndexList>,
    ) -> Result<MetadataView<'a>, DatasetError> {
        let mut view = MetadataView::new(metadata);
        if let Some(list) = indexes {
            view.set_feature_indexes_shared(Rc::clone(list))?;
        }
        Ok(view)
    }

    fn drop_overlays(&mut self) {
        self.targets.reset();
        self.weights.reset();
    }
}

impl<D: DataSet + ?Sized> DataSet for DatasetView<'_, D> {
    fn metadata(&self) -> &dyn Metadata {
        match &self.metadata {
            Some(view) => view as &dyn Metadata,
            None => self.dataset.metadata(),
        }
    }

    fn n_objects(&self) -> usize {
        match &self.objects {
            Some(list) => list.len(),
            None => self.dataset.n_objects(),
        }
    }

    fn feature(&self, object: usize, feature: usize) -> f64 {
        self.dataset.feature(
            self.actual_object_index(object),
            self.actual_feature_index(feature),
        )
    }

    fn has_feature(&self, object: usize, feature: usize) -> bool {
        self.dataset.has_feature(
            self.actual_object_index(object),
            self.actual_feature_index(feature),
        )
    }

    fn target(&self, object: usize) -> Option<usize> {
        match self.targets.get(object) {
            Some(target) => target,
            None => self.dataset.target(self.actual_object_index(object)),
        }
    }

    fn weight(&self, object: usize) -> f64 {
        match self.weights.get(object) {
            Some(weight) => weight,
            None => self.dataset.weight(self.actual_object_index(object)),
        }
    }

    fn has_confidences(&self) -> bool {
        self.dataset.has_confidences()
    }

    /// Stored confidences of the wrapped dataset are forwarded as they are;
    /// targets overlaid through this view do not change them. Without a
    /// stored matrix the default rule is applied to the view's own target.
    fn confidence(&self, object: usize, class: usize) -> f64 {
        if self.dataset.has_confidences() {
            self.dataset.confidence(self.actual_object_index(object), class)
        } else {
            default_confidence(self.target(object), class, self.n_classes())
        }
    }

    fn set_target(&mut self, object: usize, target: Option<usize>) {
        if !self.is_valid_target(target) {
            tracing::trace!(object, ?target, "ignoring invalid target");
            return;
        }
        let n_objects = self.n_objects();
        if !self.targets.is_active() {
            tracing::debug!(n_objects, "materializing target overlay");
        }
        let (dataset, objects) = (self.dataset, self.objects.as_deref());
        let targets = self.targets.materialize_with(n_objects, |p| {
            dataset.target(objects.map_or(p, |list| list[p]))
        });
        targets[object] = target;
    }

    fn set_weight(&mut self, object: usize, weight: f64) {
        if !(weight >= 0.0) {
            tracing::trace!(object, weight, "ignoring invalid weight");
            return;
        }
        let n_objects = self.n_objects();
        if !self.weights.is_active() {
            tracing::debug!(n_objects, "materializing weight overlay");
        }
        let (dataset, objects) = (self.dataset, self.objects.as_deref());
        let weights = self.weights.materialize_with(n_objects, |p| {
            dataset.weight(objects.map_or(p, |list| list[p]))
        });
        weights[object] = weight;
    }

    fn swap_objects(&mut self, a: usize, b: usize) {
        let n_objects = self.n_objects();
        let list = self.objects.get_or_insert_with(|| {
            tracing::debug!(n_objects, "creating identity object indexes");
            Rc::new(identity(n_objects))
        });
        // Copy-on-write: other views may share this list.
        Rc::make_mut(list).swap(a, b);
        self.targets.swap(a, b);
        self.weights.swap(a, b);
    }
}

impl<D: DataSet + ?Sized> fmt::Debug for DatasetView<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetView")
            .field("n_objects", &self.n_objects())
            .field("n_features", &self.n_features())
            .field("object_indexes", &self.has_object_indexes())
            .field("feature_indexes", &self.has_feature_indexes())
            .field("custom_metadata", &self.has_custom_metadata())
            .field("target_overlay", &self.has_target_overlay())
            .field("weight_overlay", &self.has_weight_overlay())
            .finish()
    }
}
