//! Zero-copy projections over datasets and metadata.
//!
//! - [`MetadataView`]: restricts / reorders the visible features
//! - [`DatasetView`]: restricts / reorders objects and features and shadows
//!   targets and weights with private overlays
//!
//! A [`DatasetView`] is itself a [`DataSet`](super::DataSet), so views can be
//! stacked; each layer resolves one level of indirection and delegates the rest.
//!
//! # Sharing
//!
//! Index lists are [`IndexList`]s: reference-counted and immutable once
//! published. The same list can back several views. A view that needs to
//! reorder its list (e.g. while sorting) clones it first if it is shared.

mod dataset;
mod metadata;

use std::rc::Rc;

use super::error::DatasetError;

pub use dataset::DatasetView;
pub use metadata::MetadataView;

/// Shared list of indexes into a wrapped dataset or metadata.
pub type IndexList = Rc<Vec<usize>>;

/// Check every index is below `bound`, reporting the first that is not.
fn validate_indexes(
    indexes: &[usize],
    bound: usize,
    error: impl FnOnce(usize) -> DatasetError,
) -> Result<(), DatasetError> {
    match indexes.iter().find(|&&i| i >= bound) {
        Some(&index) => Err(error(index)),
        None => Ok(()),
    }
}
