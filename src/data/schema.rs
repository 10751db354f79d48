//! Feature and target schema definitions.
//!
//! This module defines the descriptor types returned by [`Metadata`] queries
//! and [`Schema`], the owned metadata used by [`DenseDataSet`](super::DenseDataSet).

use ndarray::Array2;

use super::traits::Metadata;

/// Logical feature types.
///
/// Values are always stored as `f64`. The kind tells consumers how to interpret
/// them: nominal and binary values are category indexes into
/// [`FeatureMeta::nominal_values`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FeatureKind {
    /// Type is not known (e.g. string or date attributes).
    #[default]
    Unknown,

    /// Continuous numeric feature.
    Numeric,

    /// Two-valued feature, stored as `0.0` / `1.0`.
    Binary,

    /// Categorical feature stored as the index of its nominal value.
    Nominal,
}

impl FeatureKind {
    /// Returns true if values are category indexes.
    #[inline]
    pub fn is_categorical(&self) -> bool {
        matches!(self, FeatureKind::Binary | FeatureKind::Nominal)
    }

    /// Returns true if this is a numeric feature.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, FeatureKind::Numeric)
    }
}

/// Description of a single feature (or of the target).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureMeta {
    /// Feature name.
    pub name: String,

    /// Feature kind.
    pub kind: FeatureKind,

    /// Whether objects may leave this feature unset.
    ///
    /// For the target descriptor this flag means "classification refusal is allowed".
    pub may_be_missing: bool,

    /// Names of the values a nominal feature can take, in index order.
    pub nominal_values: Vec<String>,
}

impl FeatureMeta {
    /// Create metadata for a numeric feature.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Numeric,
            ..Self::default()
        }
    }

    /// Create metadata for a binary feature.
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Binary,
            ..Self::default()
        }
    }

    /// Create metadata for a nominal feature with the given value names.
    pub fn nominal<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: FeatureKind::Nominal,
            may_be_missing: false,
            nominal_values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Set whether the feature may be missing.
    pub fn with_missing(mut self, may_be_missing: bool) -> Self {
        self.may_be_missing = may_be_missing;
        self
    }

    /// Number of nominal values.
    #[inline]
    pub fn n_values(&self) -> usize {
        self.nominal_values.len()
    }
}

/// Owned dataset metadata.
///
/// Holds feature descriptors, the target descriptor and the penalty (loss)
/// matrix. The penalty matrix has shape `[n_classes, n_classes + 1]`; the last
/// column holds the cost of refusing to classify an object of a given class.
///
/// Setting the target values resets penalties to the 0/1 loss: zero on the
/// diagonal, one everywhere else (refusal included).
#[derive(Clone, Debug)]
pub struct Schema {
    name: String,
    features: Vec<FeatureMeta>,
    target: FeatureMeta,
    penalties: Array2<f64>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            name: String::new(),
            features: Vec::new(),
            target: FeatureMeta {
                kind: FeatureKind::Nominal,
                ..FeatureMeta::default()
            },
            penalties: Array2::zeros((0, 1)),
        }
    }
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a schema fluently.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Create a schema where all `n_features` features are numeric and the
    /// target has `n_classes` classes named `"0"`, `"1"`, ...
    pub fn all_numeric(n_features: usize, n_classes: usize) -> Self {
        let mut schema = Self::new();
        for i in 0..n_features {
            schema.push_feature(FeatureMeta::numeric(format!("f{i}")));
        }
        schema.set_target_values((0..n_classes).map(|c| c.to_string()));
        schema
    }

    /// Snapshot any metadata into an owned schema.
    ///
    /// Works through projections: only the visible features are copied, in
    /// visible order.
    pub fn from_metadata(metadata: &dyn Metadata) -> Self {
        let mut schema = Self::new();
        schema.name = metadata.name().to_string();
        schema.features = (0..metadata.n_features())
            .map(|i| metadata.feature(i).clone())
            .collect();
        schema.target = metadata.target().clone();
        schema.target.kind = FeatureKind::Nominal;

        let n_classes = schema.target.n_values();
        schema.penalties = Array2::from_shape_fn((n_classes, n_classes + 1), |(a, p)| {
            if p == n_classes {
                metadata.penalty(a, None)
            } else {
                metadata.penalty(a, Some(p))
            }
        });
        schema
    }

    /// Set the dataset name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Resize the feature list. New features are unnamed with unknown kind.
    pub fn set_n_features(&mut self, n_features: usize) {
        self.features.resize_with(n_features, FeatureMeta::default);
    }

    /// Append a feature.
    pub fn push_feature(&mut self, meta: FeatureMeta) {
        self.features.push(meta);
    }

    /// Replace a feature descriptor.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_features()`.
    pub fn set_feature(&mut self, index: usize, meta: FeatureMeta) {
        self.features[index] = meta;
    }

    /// Mark whether a feature may be missing.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_features()`.
    pub fn set_feature_may_be_missing(&mut self, index: usize, may_be_missing: bool) {
        self.features[index].may_be_missing = may_be_missing;
    }

    /// Set the target name.
    pub fn set_target_name(&mut self, name: impl Into<String>) {
        self.target.name = name.into();
    }

    /// Set whether classification refusal is allowed.
    pub fn set_allow_refuse(&mut self, allow: bool) {
        self.target.may_be_missing = allow;
    }

    /// Set the class labels. Resets the penalty matrix to the 0/1 loss.
    pub fn set_target_values<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target.nominal_values = values.into_iter().map(Into::into).collect();
        let n_classes = self.target.n_values();
        self.penalties = Array2::from_shape_fn((n_classes, n_classes + 1), |(a, p)| {
            if a == p {
                0.0
            } else {
                1.0
            }
        });
    }

    /// Set the penalty for predicting `predicted` (or refusing, `None`) when
    /// the actual class is `actual`.
    ///
    /// Out-of-range classes and negative penalties are ignored.
    pub fn set_penalty(&mut self, actual: usize, predicted: Option<usize>, penalty: f64) {
        let n_classes = self.target.n_values();
        let column = predicted.unwrap_or(n_classes);
        if actual >= n_classes || column > n_classes || !(penalty >= 0.0) {
            tracing::trace!(actual, ?predicted, penalty, "ignoring invalid penalty");
            return;
        }
        self.penalties[[actual, column]] = penalty;
    }

    /// Remove all features, the target description and penalties.
    pub fn clear(&mut self) {
        *self = Self {
            name: std::mem::take(&mut self.name),
            ..Self::default()
        };
    }

    /// Get an iterator over feature metadata.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureMeta> {
        self.features.iter()
    }
}

impl Metadata for Schema {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.features.len()
    }

    fn feature(&self, index: usize) -> &FeatureMeta {
        &self.features[index]
    }

    fn target(&self) -> &FeatureMeta {
        &self.target
    }

    fn penalty(&self, actual: usize, predicted: Option<usize>) -> f64 {
        match predicted {
            Some(p) => {
                assert!(
                    p < self.n_classes(),
                    "predicted class {p} out of range for {} classes",
                    self.n_classes()
                );
                self.penalties[[actual, p]]
            }
            None if self.allows_refuse() => self.penalties[[actual, self.n_classes()]],
            None => f64::INFINITY,
        }
    }
}

/// Fluent builder for [`Schema`].
///
/// # Example
///
/// ```
/// use mll_data::data::{FeatureMeta, Metadata, Schema};
///
/// let schema = Schema::builder()
///     .name("weather")
///     .feature(FeatureMeta::numeric("temperature"))
///     .feature(FeatureMeta::nominal("outlook", ["sunny", "rainy"]))
///     .target("play", ["no", "yes"])
///     .build();
///
/// assert_eq!(schema.n_features(), 2);
/// assert_eq!(schema.n_classes(), 2);
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Set the dataset name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.schema.set_name(name);
        self
    }

    /// Append a feature.
    pub fn feature(mut self, meta: FeatureMeta) -> Self {
        self.schema.push_feature(meta);
        self
    }

    /// Set the target name and class labels.
    pub fn target<I, S>(mut self, name: impl Into<String>, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema.set_target_name(name);
        self.schema.set_target_values(classes);
        self
    }

    /// Allow (or forbid) classification refusal.
    pub fn allow_refuse(mut self, allow: bool) -> Self {
        self.schema.set_allow_refuse(allow);
        self
    }

    /// Override one penalty entry. Must be called after [`target`](Self::target).
    pub fn penalty(mut self, actual: usize, predicted: Option<usize>, penalty: f64) -> Self {
        self.schema.set_penalty(actual, predicted, penalty);
        self
    }

    /// Finish building.
    pub fn build(self) -> Schema {
        self.schema
    }
}
