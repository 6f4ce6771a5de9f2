//! Experiment tracking
//!
//! The metric sink the reporter writes to, a local run record that
//! implements it, and JSON storage for finished runs.

mod storage;
mod tracker;

pub use storage::{LocalStorage, StorageBackend};
pub use tracker::{MetricEntry, MetricSink, MetricValue, Run, RunStatus};
