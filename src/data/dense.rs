//! Dense in-memory dataset.
//!
//! [`DenseDataSet`] owns its [`Schema`] and stores every value explicitly.
//! It is the reference backing store for views and the target of explicit
//! materialization ([`DenseDataSet::from_dataset`]).

use ndarray::{aview1, s, Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::error::DatasetError;
use super::schema::{FeatureMeta, Schema};
use super::traits::{default_confidence, DataSet, Metadata};

/// Dense dataset with object-major storage.
///
/// # Storage Layout
///
/// - features: `[n_objects, n_features]`, one contiguous row per object
/// - targets: one class per object, `None` for refusal
/// - weights: one weight per object (1.0 for new objects)
/// - confidences: optional `[n_objects, n_classes]` soft labels
///
/// The feature matrix may be narrower than the schema when features were
/// declared through [`schema_mut`](Self::schema_mut) after rows were
/// allocated. Reads beyond the stored columns return `NAN` for features that
/// may be missing and `0.0` otherwise.
///
/// # Example
///
/// ```
/// use mll_data::data::{DataSet, DenseDataSet, Schema};
///
/// let mut ds = DenseDataSet::with_objects(Schema::all_numeric(1, 2), 3);
/// ds.set_feature(0, 0, 2.5);
/// ds.set_target(1, Some(1));
///
/// assert_eq!(ds.n_objects(), 3);
/// assert_eq!(ds.feature(0, 0), 2.5);
/// assert_eq!(ds.target(1), Some(1));
/// assert_eq!(ds.weight(2), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DenseDataSet {
    schema: Schema,
    features: Array2<f64>,
    targets: Vec<Option<usize>>,
    weights: Array1<f64>,
    confidences: Option<Array2<f64>>,
}

impl DenseDataSet {
    /// Create an empty dataset with the given schema.
    pub fn new(schema: Schema) -> Self {
        Self::with_objects(schema, 0)
    }

    /// Create a dataset with `n_objects` default objects.
    pub fn with_objects(schema: Schema, n_objects: usize) -> Self {
        let n_features = schema.n_features();
        let features = Array2::from_shape_fn((n_objects, n_features), |(_, j)| {
            default_value(schema.feature(j))
        });
        let target = default_target(&schema);
        Self {
            schema,
            features,
            targets: vec![target; n_objects],
            weights: Array1::ones(n_objects),
            confidences: None,
        }
    }

    /// Create a dataset from prepared arrays.
    ///
    /// `features` is object-major: `[n_objects, n_features]`. Weights default
    /// to 1.0. Features containing `NAN` are marked as possibly missing.
    ///
    /// # Errors
    ///
    /// Fails if shapes disagree with each other or with the schema, if a target
    /// is not a valid class, or if a weight is negative.
    pub fn from_arrays(
        mut schema: Schema,
        features: Array2<f64>,
        targets: Vec<Option<usize>>,
        weights: Option<Array1<f64>>,
    ) -> Result<Self, DatasetError> {
        let rows = features.nrows();
        if features.ncols() != schema.n_features() {
            return Err(DatasetError::FeatureLenMismatch {
                expected: schema.n_features(),
                got: features.ncols(),
            });
        }
        if targets.len() != rows {
            return Err(DatasetError::TargetLenMismatch {
                rows,
                targets: targets.len(),
            });
        }
        let n_classes = schema.n_classes();
        if let Some((object, target)) = targets
            .iter()
            .enumerate()
            .find_map(|(i, t)| t.filter(|&c| c >= n_classes).map(|c| (i, c)))
        {
            return Err(DatasetError::InvalidTarget {
                object,
                target,
                n_classes,
            });
        }
        let weights = match weights {
            Some(w) if w.len() != rows => {
                return Err(DatasetError::WeightLenMismatch {
                    rows,
                    weights: w.len(),
                })
            }
            Some(w) => w,
            None => Array1::ones(rows),
        };
        if let Some((object, &weight)) = weights.iter().enumerate().find(|(_, w)| !(**w >= 0.0)) {
            return Err(DatasetError::InvalidWeight { object, weight });
        }

        for (j, column) in features.columns().into_iter().enumerate() {
            if column.iter().any(|v| v.is_nan()) {
                schema.set_feature_may_be_missing(j, true);
            }
        }

        Ok(Self {
            schema,
            features,
            targets,
            weights,
            confidences: None,
        })
    }

    /// Copy the visible state of any dataset (including views) into a new store.
    pub fn from_dataset<D: DataSet + ?Sized>(dataset: &D) -> Self {
        let n_objects = dataset.n_objects();
        let n_features = dataset.n_features();
        let n_classes = dataset.n_classes();
        tracing::debug!(n_objects, n_features, "materializing dataset");

        let confidences = dataset.has_confidences().then(|| {
            Array2::from_shape_fn((n_objects, n_classes), |(o, c)| dataset.confidence(o, c))
        });
        Self {
            schema: Schema::from_metadata(dataset.metadata()),
            features: Array2::from_shape_fn((n_objects, n_features), |(o, j)| {
                dataset.feature(o, j)
            }),
            targets: (0..n_objects).map(|o| dataset.target(o)).collect(),
            weights: Array1::from_shape_fn(n_objects, |o| dataset.weight(o)),
            confidences,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The owned schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Mutable schema.
    ///
    /// Growing the feature list here leaves stored rows short; they read as
    /// missing (or 0.0) until written. Use [`resize`](Self::resize) or
    /// [`push_feature`](Self::push_feature) to allocate the columns eagerly.
    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    /// Stored feature values, `[n_objects, stored_features]`.
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// All object weights.
    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    /// All object targets.
    pub fn targets(&self) -> &[Option<usize>] {
        &self.targets
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Set the value of a feature. A `NAN` marks the feature as possibly missing.
    ///
    /// # Panics
    ///
    /// Panics if `object >= n_objects()` or `feature >= n_features()`.
    pub fn set_feature(&mut self, object: usize, feature: usize, value: f64) {
        let may_be_missing = self.schema.feature(feature).may_be_missing;
        if value.is_nan() && !may_be_missing {
            self.schema.set_feature_may_be_missing(feature, true);
        }
        if feature >= self.features.ncols() {
            self.fit_columns();
        }
        self.features[[object, feature]] = value;
    }

    /// Set the confidence that `object` belongs to `class`.
    ///
    /// The first call creates the confidence matrix from the current targets.
    /// Negative values and unknown classes are ignored.
    pub fn set_confidence(&mut self, object: usize, class: usize, confidence: f64) {
        let n_classes = self.n_classes();
        if class >= n_classes || !(confidence >= 0.0) {
            tracing::trace!(object, class, confidence, "ignoring invalid confidence");
            return;
        }
        let targets = &self.targets;
        let matrix = self.confidences.get_or_insert_with(|| {
            tracing::debug!(n_classes, "creating confidence matrix");
            Array2::from_shape_fn((targets.len(), n_classes), |(o, c)| {
                default_confidence(targets[o], c, n_classes)
            })
        });
        matrix[[object, class]] = confidence;
    }

    /// Drop the confidence matrix, reverting to hard-label confidences.
    pub fn clear_confidences(&mut self) {
        self.confidences = None;
    }

    /// Append a default object and return its index.
    pub fn add_object(&mut self) -> usize {
        let index = self.targets.len();
        let n_features = self.schema.n_features();
        let row = Array1::from_shape_fn(n_features, |j| default_value(self.schema.feature(j)));
        if self.features.push_row(row.view()).is_err() {
            // Stored rows are short: widen to the schema while growing.
            self.features = self.resized_features(index + 1, n_features);
        }
        self.targets.push(default_target(&self.schema));
        if self.weights.append(Axis(0), aview1(&[1.0])).is_err() {
            self.weights = self.weights.iter().copied().chain([1.0]).collect();
        }
        if let Some(matrix) = self.confidences.as_mut() {
            let n_classes = matrix.ncols();
            let target = self.targets[index];
            let row =
                Array1::from_shape_fn(n_classes, |c| default_confidence(target, c, n_classes));
            if matrix.push_row(row.view()).is_err() {
                tracing::debug!(n_classes, "dropping confidence matrix that no longer fits");
                self.confidences = None;
            }
        }
        index
    }

    /// Append a feature column filled with its default value.
    pub fn push_feature(&mut self, meta: FeatureMeta) {
        self.schema.push_feature(meta);
        self.fit_columns();
    }

    /// Resize to `n_objects` objects and `n_features` features, keeping the
    /// overlapping values. New objects get target class 0 and weight 1.0.
    /// The confidence matrix is dropped.
    pub fn resize(&mut self, n_objects: usize, n_features: usize) {
        self.schema.set_n_features(n_features);
        self.features = self.resized_features(n_objects, n_features);
        let target = default_target(&self.schema);
        self.targets.resize(n_objects, target);
        self.weights =
            Array1::from_shape_fn(n_objects, |o| self.weights.get(o).copied().unwrap_or(1.0));
        self.confidences = None;
    }

    /// Remove all objects. The schema is kept.
    pub fn clear(&mut self) {
        self.features = Array2::zeros((0, self.schema.n_features()));
        self.targets.clear();
        self.weights = Array1::zeros(0);
        self.confidences = None;
    }

    fn fit_columns(&mut self) {
        self.features = self.resized_features(self.targets.len(), self.schema.n_features());
    }

    fn resized_features(&self, n_objects: usize, n_features: usize) -> Array2<f64> {
        let mut resized = Array2::from_shape_fn((n_objects, n_features), |(_, j)| {
            if j < self.schema.n_features() {
                default_value(self.schema.feature(j))
            } else {
                0.0
            }
        });
        let rows = n_objects.min(self.features.nrows());
        let cols = n_features.min(self.features.ncols());
        resized
            .slice_mut(s![..rows, ..cols])
            .assign(&self.features.slice(s![..rows, ..cols]));
        resized
    }
}

impl DataSet for DenseDataSet {
    fn metadata(&self) -> &dyn Metadata {
        &self.schema
    }

    #[inline]
    fn n_objects(&self) -> usize {
        self.targets.len()
    }

    fn feature(&self, object: usize, feature: usize) -> f64 {
        let meta = self.schema.feature(feature);
        if feature < self.features.ncols() {
            self.features[[object, feature]]
        } else {
            assert!(object < self.n_objects(), "object index {object} out of range");
            default_value(meta)
        }
    }

    #[inline]
    fn target(&self, object: usize) -> Option<usize> {
        self.targets[object]
    }

    #[inline]
    fn weight(&self, object: usize) -> f64 {
        self.weights[object]
    }

    fn has_confidences(&self) -> bool {
        self.confidences.is_some()
    }

    fn confidence(&self, object: usize, class: usize) -> f64 {
        match &self.confidences {
            Some(matrix) => matrix[[object, class]],
            None => default_confidence(self.targets[object], class, self.n_classes()),
        }
    }

    fn set_target(&mut self, object: usize, target: Option<usize>) {
        if self.is_valid_target(target) {
            self.targets[object] = target;
        } else {
            tracing::trace!(object, ?target, "ignoring invalid target");
        }
    }

    fn set_weight(&mut self, object: usize, weight: f64) {
        if weight >= 0.0 {
            self.weights[object] = weight;
        } else {
            tracing::trace!(object, weight, "ignoring invalid weight");
        }
    }

    fn swap_objects(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.targets.swap(a, b);
        self.weights.swap(a, b);
        swap_rows(&mut self.features, a, b);
        if let Some(matrix) = self.confidences.as_mut() {
            swap_rows(matrix, a, b);
        }
    }
}

fn swap_rows(matrix: &mut Array2<f64>, a: usize, b: usize) {
    for j in 0..matrix.ncols() {
        matrix.swap([a, j], [b, j]);
    }
}

/// Value of an unset feature.
#[inline]
fn default_value(meta: &FeatureMeta) -> f64 {
    if meta.may_be_missing {
        f64::NAN
    } else {
        0.0
    }
}

#[inline]
fn default_target(schema: &Schema) -> Option<usize> {
    (schema.n_classes() > 0).then_some(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small() -> DenseDataSet {
        let schema = Schema::builder()
            .feature(FeatureMeta::numeric("x"))
            .feature(FeatureMeta::numeric("y"))
            .target("class", ["a", "b"])
            .build();
        DenseDataSet::from_arrays(
            schema,
            array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]],
            vec![Some(0), Some(1), Some(0)],
            Some(array![0.5, 1.0, 2.0]),
        )
        .unwrap()
    }

    #[test]
    fn new_objects_have_defaults() {
        let ds = DenseDataSet::with_objects(Schema::all_numeric(2, 3), 4);
        assert_eq!(ds.n_objects(), 4);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.target(3), Some(0));
        assert_eq!(ds.weight(3), 1.0);
        assert_eq!(ds.feature(3, 1), 0.0);
        assert!(!ds.has_confidences());
    }

    #[test]
    fn from_arrays_validates_shapes() {
        let schema = Schema::all_numeric(2, 2);
        let err = DenseDataSet::from_arrays(schema.clone(), Array2::zeros((2, 3)), vec![None; 2], None)
            .unwrap_err();
        assert_eq!(err, DatasetError::FeatureLenMismatch { expected: 2, got: 3 });

        let err = DenseDataSet::from_arrays(schema.clone(), Array2::zeros((2, 2)), vec![None; 3], None)
            .unwrap_err();
        assert_eq!(err, DatasetError::TargetLenMismatch { rows: 2, targets: 3 });

        let err = DenseDataSet::from_arrays(
            schema.clone(),
            Array2::zeros((2, 2)),
            vec![None; 2],
            Some(Array1::ones(1)),
        )
        .unwrap_err();
        assert_eq!(err, DatasetError::WeightLenMismatch { rows: 2, weights: 1 });

        let err = DenseDataSet::from_arrays(
            schema.clone(),
            Array2::zeros((2, 2)),
            vec![Some(0), Some(2)],
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DatasetError::InvalidTarget {
                object: 1,
                target: 2,
                n_classes: 2
            }
        );

        let err = DenseDataSet::from_arrays(
            schema,
            Array2::zeros((2, 2)),
            vec![None; 2],
            Some(array![1.0, -1.0]),
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidWeight { object: 1, .. }));
    }

    #[test]
    fn from_arrays_marks_missing_features() {
        let ds = DenseDataSet::from_arrays(
            Schema::all_numeric(2, 2),
            array![[1.0, f64::NAN], [2.0, 3.0]],
            vec![Some(0), Some(1)],
            None,
        )
        .unwrap();
        assert!(!ds.metadata().feature(0).may_be_missing);
        assert!(ds.metadata().feature(1).may_be_missing);
        assert!(!ds.has_feature(0, 1));
        assert!(ds.has_feature(1, 1));
    }

    #[test]
    fn invalid_writes_are_ignored() {
        let mut ds = small();
        ds.set_target(0, Some(5));
        ds.set_weight(0, -1.0);
        ds.set_weight(0, f64::NAN);
        assert_eq!(ds.target(0), Some(0));
        assert_eq!(ds.weight(0), 0.5);

        ds.set_target(0, None);
        assert_eq!(ds.target(0), None);
    }

    #[test]
    fn swap_moves_whole_objects() {
        let mut ds = small();
        ds.set_confidence(0, 1, 0.3);
        ds.swap_objects(0, 2);
        assert_eq!(ds.feature(0, 0), 3.0);
        assert_eq!(ds.feature(2, 1), 10.0);
        assert_eq!(ds.weight(0), 2.0);
        assert_eq!(ds.weight(2), 0.5);
        assert_eq!(ds.confidence(2, 1), 0.3);
        assert_eq!(ds.confidence(0, 0), 1.0);
    }

    #[test]
    fn confidence_defaults_follow_targets() {
        let mut ds = small();
        assert_eq!(ds.confidence(1, 1), 1.0);
        assert_eq!(ds.confidence(1, 0), 0.0);
        ds.set_target(1, None);
        assert_eq!(ds.confidence(1, 0), 0.5);

        ds.set_confidence(0, 0, -0.1);
        ds.set_confidence(0, 9, 0.1);
        assert!(!ds.has_confidences());
    }

    #[test]
    fn short_rows_read_as_default() {
        let mut ds = small();
        ds.schema_mut().push_feature(FeatureMeta::numeric("z").with_missing(true));
        ds.schema_mut().push_feature(FeatureMeta::numeric("w"));
        assert_eq!(ds.n_features(), 4);
        assert!(ds.feature(0, 2).is_nan());
        assert_eq!(ds.feature(0, 3), 0.0);

        ds.set_feature(1, 3, 4.0);
        assert_eq!(ds.feature(1, 3), 4.0);
        assert_eq!(ds.feature(1, 0), 2.0);
        assert!(ds.feature(2, 2).is_nan());
    }

    #[test]
    fn add_object_and_push_feature() {
        let mut ds = small();
        let idx = ds.add_object();
        assert_eq!(idx, 3);
        assert_eq!(ds.n_objects(), 4);
        assert_eq!(ds.weight(3), 1.0);
        assert_eq!(ds.target(3), Some(0));

        ds.push_feature(FeatureMeta::binary("flag").with_missing(true));
        assert_eq!(ds.n_features(), 3);
        assert!(ds.feature(3, 2).is_nan());
        assert_eq!(ds.feature(1, 1), 20.0);
    }

    #[test]
    fn add_object_grows_weights_and_confidences() {
        let mut ds = small();
        ds.set_confidence(1, 0, 0.25);
        for _ in 0..50 {
            ds.add_object();
        }
        assert_eq!(ds.n_objects(), 53);
        assert_eq!(ds.weights().len(), 53);
        assert_eq!(ds.weights().slice(s![..3]), array![0.5, 1.0, 2.0]);
        assert!((3..53).all(|o| ds.weight(o) == 1.0));
        assert!(ds.has_confidences());
        assert_eq!(ds.confidence(1, 0), 0.25);
        assert_eq!(ds.confidence(52, 0), 1.0);
    }

    #[test]
    fn resize_keeps_overlap() {
        let mut ds = small();
        ds.resize(5, 1);
        assert_eq!(ds.n_objects(), 5);
        assert_eq!(ds.n_features(), 1);
        assert_eq!(ds.feature(2, 0), 3.0);
        assert_eq!(ds.weight(2), 2.0);
        assert_eq!(ds.weight(4), 1.0);

        ds.clear();
        assert_eq!(ds.n_objects(), 0);
        assert_eq!(ds.n_features(), 1);
    }

    #[test]
    fn set_feature_nan_marks_missing() {
        let mut ds = small();
        ds.set_feature(0, 1, f64::NAN);
        assert!(ds.metadata().feature(1).may_be_missing);
        assert!(!ds.has_feature(0, 1));
    }

    #[test]
    fn from_dataset_copies_everything() {
        let mut ds = small();
        ds.set_confidence(2, 1, 0.75);
        let copy = DenseDataSet::from_dataset(&ds);
        assert_eq!(copy.n_objects(), 3);
        assert_eq!(copy.features(), ds.features());
        assert_eq!(copy.targets(), ds.targets());
        assert_eq!(copy.weights(), ds.weights());
        assert!(copy.has_confidences());
        assert_eq!(copy.confidence(2, 1), 0.75);
    }
}
