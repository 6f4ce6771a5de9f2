//! Hyperdrive Train - one gradient boosted training run per process
//!
//! Loads a named tabular dataset, one-hot encodes it, holds out a seeded
//! validation split, fits an XGBoost-style classifier with externally
//! supplied hyperparameters, and reports the model plus its metrics.
//!
//! # Modules
//!
//! - [`data`] - Scalar records and the dataset registry
//! - [`preprocessing`] - Label and one-hot encoding
//! - [`training`] - Hyperparameters, split, booster and trainer
//! - [`evaluation`] - Accuracy and weighted AUC
//! - [`export`] - Model artifact format
//! - [`tracking`] - Metric sink, runs and run storage
//! - [`reporting`] - Artifact persistence and metric emission
//! - [`pipeline`] - Run configuration and the run state machine
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data and model
pub mod data;
pub mod preprocessing;
pub mod training;
pub mod evaluation;

// Outputs
pub mod export;
pub mod tracking;
pub mod reporting;

// Orchestration
pub mod pipeline;
pub mod cli;

pub use error::{HyperdriveError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{HyperdriveError, Result};

    pub use crate::data::{Dataset, DatasetSource, LocalRegistry, Value};
    pub use crate::preprocessing::{encode, EncodedData, FittedEncoders};
    pub use crate::training::{train, HyperparameterConfig, TrainValidationSplitter, TrainedModel};
    pub use crate::evaluation::{evaluate, MetricSet};
    pub use crate::export::{load_model, save_model, ARTIFACT_FILE_NAME};
    pub use crate::tracking::{LocalStorage, MetricSink, MetricValue, Run, RunStatus, StorageBackend};
    pub use crate::reporting::Reporter;
    pub use crate::pipeline::{RunConfig, RunStage, RunSummary, TrainingRun};
}
