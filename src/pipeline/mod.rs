//! End-to-end training pipeline
//!
//! CLI → hyperparameters → encode → split → train → evaluate → report.

mod config;
mod run;

pub use config::RunConfig;
pub use run::{RunStage, RunSummary, TrainingRun};
