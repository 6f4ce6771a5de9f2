//! Run reporting
//!
//! Persists the fitted model, then emits the hyperparameters and
//! validation metrics to the injected [`MetricSink`].

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;
use crate::evaluation::MetricSet;
use crate::export::{ensure_artifact_dir, save_model, ARTIFACT_FILE_NAME};
use crate::tracking::{MetricSink, MetricValue};
use crate::training::{HyperparameterConfig, TrainedModel};

/// Where the artifact landed and what was emitted
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub artifact_path: PathBuf,
    pub artifact_bytes: u64,
    pub records: usize,
}

/// Hyperparameters as tracking records, in emission order
pub fn hyperparameter_records(config: &HyperparameterConfig) -> Result<Vec<(&'static str, MetricValue)>> {
    Ok(vec![
        ("learning_rate", MetricValue::Float(config.learning_rate)),
        ("n_estimators", MetricValue::try_from(config.n_estimators)?),
        ("max_depth", MetricValue::try_from(config.max_depth)?),
        ("min_child_weight", MetricValue::from(config.min_child_weight)),
        ("gamma", MetricValue::Float(config.gamma)),
        ("subsample", MetricValue::Float(config.subsample)),
        ("colsample_bytree", MetricValue::Float(config.colsample_bytree)),
        ("reg_lambda", MetricValue::Float(config.reg_lambda)),
        ("reg_alpha", MetricValue::Float(config.reg_alpha)),
    ])
}

pub struct Reporter<S: MetricSink> {
    sink: S,
}

impl<S: MetricSink> Reporter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Write the artifact under `artifact_dir`, then record 11 pairs.
    ///
    /// A persistence failure returns before anything is recorded.
    pub fn report(
        &mut self,
        config: &HyperparameterConfig,
        metrics: &MetricSet,
        model: &TrainedModel,
        artifact_dir: &Path,
    ) -> Result<ReportOutcome> {
        ensure_artifact_dir(artifact_dir)?;
        let artifact_path = artifact_dir.join(ARTIFACT_FILE_NAME);
        let artifact_bytes = save_model(model, &artifact_path)?;

        let mut records = hyperparameter_records(config)?;
        records.extend(metrics.entries().into_iter().map(|(name, v)| (name, MetricValue::Float(v))));

        for (name, value) in &records {
            debug!(name, %value, "Recording");
            self.sink.record(name, *value)?;
        }

        info!(artifact = %artifact_path.display(), records = records.len(), "Run reported");
        Ok(ReportOutcome {
            artifact_path,
            artifact_bytes,
            records: records.len(),
        })
    }
}
