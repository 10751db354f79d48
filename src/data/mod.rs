//! Dataset access abstractions for classifiers.
//!
//! This module provides the [`DataSet`] and [`Metadata`] traits and the types
//! that implement them.
//!
//! # Overview
//!
//! Learners see data through [`DataSet`]: a table of objects, each with feature
//! values, a target class and a weight, described by [`Metadata`]. Whether the
//! table is a concrete store or a projection of another table is invisible to
//! them.
//!
//! # Storage Types
//!
//! - [`DenseDataSet`]: owned, object-major storage with its own [`Schema`]
//!
//! # Views
//!
//! - [`MetadataView`]: restricted / reordered features over any metadata
//! - [`DatasetView`]: restricted / reordered objects and features, with private
//!   target and weight overrides, over any dataset (including another view)
//!
//! # Reordering
//!
//! Every dataset can be sorted, shuffled and reversed. All of these reduce to
//! [`DataSet::swap_objects`] through the [`permutation`] engine, so views
//! reorder their index lists and never touch the wrapped data.
//!
//! # Missing Values
//!
//! Missing feature values are `f64::NAN`. Refusal (no class) is `None`,
//! also available as [`REFUSE`].

mod dense;
mod error;
mod options;
mod overlay;
pub mod permutation;
mod schema;
mod traits;
mod views;

pub use dense::DenseDataSet;
pub use error::DatasetError;
pub use options::{ShuffleOptions, SortKey, SortOptions};
pub use overlay::Overlay;
pub use schema::{FeatureKind, FeatureMeta, Schema, SchemaBuilder};
pub use traits::{default_confidence, DataSet, Metadata, REFUSE};
pub use views::{DatasetView, IndexList, MetadataView};
