//! Tabular data model and dataset resolution
//!
//! - [`Dataset`] / [`Value`]: ordered records of scalar cells
//! - [`DatasetSource`] / [`LocalRegistry`]: resolve a dataset name to records

mod dataset;
mod registry;

pub use dataset::{Dataset, Value};
pub use registry::{dataframe_to_dataset, DatasetSource, LocalRegistry};
