//! Run configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{HyperdriveError, Result};
use crate::export::ARTIFACT_FILE_NAME;
use crate::training::{DEFAULT_SPLIT_SEED, DEFAULT_VALIDATION_FRACTION};

/// Everything about a run that is not a booster hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Name resolved by the dataset registry
    pub dataset: String,

    /// Root directory of the local registry
    pub data_dir: PathBuf,

    /// Binary target column
    pub target_column: String,

    /// Directory receiving the model artifact
    pub output_dir: PathBuf,

    /// Directory receiving tracked runs
    pub tracking_dir: PathBuf,

    /// Share of rows held out for validation
    pub validation_fraction: f64,

    /// Seed of the train/validation shuffle
    pub split_seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset: "attrition_train".to_string(),
            data_dir: PathBuf::from("data"),
            target_column: "Attrition".to_string(),
            output_dir: PathBuf::from("outputs"),
            tracking_dir: PathBuf::from("runs"),
            validation_fraction: DEFAULT_VALIDATION_FRACTION,
            split_seed: DEFAULT_SPLIT_SEED,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, name: impl Into<String>) -> Self {
        self.dataset = name.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_target(mut self, column: impl Into<String>) -> Self {
        self.target_column = column.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_tracking_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tracking_dir = dir.into();
        self
    }

    pub fn with_validation_fraction(mut self, fraction: f64) -> Self {
        self.validation_fraction = fraction;
        self
    }

    pub fn with_split_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self
    }

    /// Full path of the model artifact
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(ARTIFACT_FILE_NAME)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dataset.trim().is_empty() {
            return Err(HyperdriveError::ConfigError("dataset name is empty".to_string()));
        }
        if self.target_column.is_empty() {
            return Err(HyperdriveError::ConfigError("target column is empty".to_string()));
        }
        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(HyperdriveError::ConfigError(format!(
                "validation fraction must be in (0, 1), got {}",
                self.validation_fraction
            )));
        }
        Ok(())
    }
}
