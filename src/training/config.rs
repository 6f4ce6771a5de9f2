//! Hyperparameter configuration

use serde::{Deserialize, Serialize};

/// The nine booster knobs a search controller may set for one run.
///
/// Built once per process and never mutated; values reach the booster
/// exactly as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterConfig {
    /// Boosting learning rate (xgb's `eta`)
    pub learning_rate: f64,

    /// Number of boosting rounds
    pub n_estimators: usize,

    /// Maximum tree depth for base learners
    pub max_depth: usize,

    /// Minimum sum of instance weight (hessian) needed in a child
    pub min_child_weight: u32,

    /// Minimum loss reduction required to split a leaf
    pub gamma: f64,

    /// Subsample ratio of the training instances
    pub subsample: f64,

    /// Subsample ratio of columns when constructing each tree
    pub colsample_bytree: f64,

    /// L2 regularization term on leaf weights
    pub reg_lambda: f64,

    /// L1 regularization term on leaf weights
    pub reg_alpha: f64,
}

impl Default for HyperparameterConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.3,
            n_estimators: 100,
            max_depth: 6,
            min_child_weight: 1,
            gamma: 0.0,
            subsample: 1.0,
            colsample_bytree: 1.0,
            reg_lambda: 1.0,
            reg_alpha: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = HyperparameterConfig::default();
        assert_eq!(cfg.learning_rate, 0.3);
        assert_eq!(cfg.n_estimators, 100);
        assert_eq!(cfg.max_depth, 6);
        assert_eq!(cfg.min_child_weight, 1);
        assert_eq!(cfg.gamma, 0.0);
        assert_eq!(cfg.subsample, 1.0);
        assert_eq!(cfg.colsample_bytree, 1.0);
        assert_eq!(cfg.reg_lambda, 1.0);
        assert_eq!(cfg.reg_alpha, 0.0);
    }

    #[test]
    fn test_json_roundtrip_keeps_names() {
        let cfg = HyperparameterConfig {
            learning_rate: 0.05,
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"colsample_bytree\":1.0"));
        let back: HyperparameterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
