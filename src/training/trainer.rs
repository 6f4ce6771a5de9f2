//! Binds a hyperparameter configuration to the booster and fits it

use crate::error::Result;
use crate::training::config::HyperparameterConfig;
use crate::training::xgboost::{XGBoostClassifier, XGBoostConfig};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Seed of the booster's row/column sampling RNG
pub const BOOSTER_SEED: u64 = 0;

impl From<&HyperparameterConfig> for XGBoostConfig {
    fn from(hp: &HyperparameterConfig) -> Self {
        Self {
            n_estimators: hp.n_estimators,
            learning_rate: hp.learning_rate,
            max_depth: hp.max_depth,
            min_child_weight: f64::from(hp.min_child_weight),
            reg_lambda: hp.reg_lambda,
            reg_alpha: hp.reg_alpha,
            gamma: hp.gamma,
            subsample: hp.subsample,
            colsample_bytree: hp.colsample_bytree,
            random_state: BOOSTER_SEED,
        }
    }
}

/// A fitted classifier together with the knobs it was fitted with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    hyperparameters: HyperparameterConfig,
    classifier: XGBoostClassifier,
}

impl TrainedModel {
    pub fn hyperparameters(&self) -> &HyperparameterConfig {
        &self.hyperparameters
    }

    pub fn classifier(&self) -> &XGBoostClassifier {
        &self.classifier
    }

    pub fn n_trees(&self) -> usize {
        self.classifier.n_trees()
    }

    pub fn n_features(&self) -> usize {
        self.classifier.n_features()
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.classifier.predict_proba(x)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.classifier.predict(x)
    }

    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        self.classifier.score(x, y)
    }

    pub fn feature_importances(&self) -> Option<Array1<f64>> {
        self.classifier.feature_importances()
    }
}

/// Fit a booster with exactly the given hyperparameters.
///
/// One blocking fit: no early stopping, no checkpoints.
pub fn train(config: &HyperparameterConfig, x_train: &Array2<f64>, y_train: &Array1<f64>) -> Result<TrainedModel> {
    let booster_config = XGBoostConfig::from(config);
    debug!(config = ?booster_config, "Booster configured");

    let start = Instant::now();
    let mut classifier = XGBoostClassifier::new(booster_config);
    classifier.fit(x_train, y_train)?;

    info!(
        rows = x_train.nrows(),
        features = x_train.ncols(),
        trees = classifier.n_trees(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Model trained"
    );

    Ok(TrainedModel {
        hyperparameters: *config,
        classifier,
    })
}
