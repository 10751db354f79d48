//! mll-data: dataset access layer for classifier toolkits.
//!
//! This crate provides a uniform, swap-based interface over labelled tabular
//! data, a dense reference store, and zero-copy views that restrict, reorder
//! and relabel datasets without modifying them.
//!
//! ```
//! use mll_data::{DataSet, DatasetView, DenseDataSet, Schema};
//!
//! let mut ds = DenseDataSet::with_objects(Schema::all_numeric(1, 2), 3);
//! for (i, v) in [3.0, 1.0, 2.0].into_iter().enumerate() {
//!     ds.set_feature(i, 0, v);
//! }
//!
//! let mut sorted = DatasetView::new(&ds);
//! sorted.sort_by_feature(0, false);
//! assert_eq!(sorted.feature(0, 0), 1.0);
//! assert_eq!(ds.feature(0, 0), 3.0);
//! ```

pub mod data;
pub mod testing;

// Re-export approx traits for users who want to compare values in tests
pub use approx;

pub use data::{
    DataSet, DatasetError, DatasetView, DenseDataSet, FeatureMeta, Metadata, MetadataView, Schema,
    REFUSE,
};
