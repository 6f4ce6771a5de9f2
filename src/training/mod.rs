//! Model training module
//!
//! - Hyperparameter configuration
//! - Seeded train/validation split
//! - XGBoost-style gradient boosted classifier
//! - Trainer binding the two together

mod config;
mod split;
mod trainer;
pub mod xgboost;

pub use config::HyperparameterConfig;
pub use split::{split, Split, SplitIndices, TrainValidationSplitter, DEFAULT_SPLIT_SEED, DEFAULT_VALIDATION_FRACTION};
pub use trainer::{train, TrainedModel, BOOSTER_SEED};
pub use xgboost::{TreeNode, XGBoostClassifier, XGBoostConfig};
