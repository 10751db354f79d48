//! Error types for dataset construction and projection.

/// Dataset construction / projection errors.
///
/// These are validation failures: the operation that returns one has not
/// changed any state. Per-object setters never report invalid values (an
/// unknown class, a negative weight) through this type; they ignore them.
/// Bulk construction from arrays does report them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("object index {index} out of range for dataset with {n_objects} objects")]
    ObjectIndexOutOfRange { index: usize, n_objects: usize },

    #[error("feature index {index} out of range for metadata with {n_features} features")]
    FeatureIndexOutOfRange { index: usize, n_features: usize },

    #[error("a view must wrap an existing dataset")]
    MissingDataset,

    #[error("number of targets ({targets}) does not match number of rows ({rows})")]
    TargetLenMismatch { rows: usize, targets: usize },

    #[error("number of weights ({weights}) does not match number of rows ({rows})")]
    WeightLenMismatch { rows: usize, weights: usize },

    #[error("feature matrix has {got} columns but the schema declares {expected} features")]
    FeatureLenMismatch { expected: usize, got: usize },

    #[error("object {object} has target {target} but the schema declares {n_classes} classes")]
    InvalidTarget {
        object: usize,
        target: usize,
        n_classes: usize,
    },

    #[error("object {object} has invalid weight {weight}")]
    InvalidWeight { object: usize, weight: f64 },
}
