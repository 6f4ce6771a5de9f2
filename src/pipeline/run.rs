//! Training run orchestration
//!
//! Drives `Init → Encoded → Split → Trained → Evaluated → Reported → Done`.
//! The first error moves the run to `Failed` and nothing after it runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

use crate::data::{Dataset, DatasetSource};
use crate::error::{HyperdriveError, Result};
use crate::evaluation::{evaluate, MetricSet};
use crate::pipeline::config::RunConfig;
use crate::preprocessing;
use crate::reporting::Reporter;
use crate::tracking::MetricSink;
use crate::training::{train, HyperparameterConfig, TrainValidationSplitter};

/// Position of a run in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStage {
    Init,
    Encoded,
    Split,
    Trained,
    Evaluated,
    Reported,
    Done,
    /// Carries the last stage reached before the failure
    Failed(Box<RunStage>),
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStage::Init => write!(f, "init"),
            RunStage::Encoded => write!(f, "encoded"),
            RunStage::Split => write!(f, "split"),
            RunStage::Trained => write!(f, "trained"),
            RunStage::Evaluated => write!(f, "evaluated"),
            RunStage::Reported => write!(f, "reported"),
            RunStage::Done => write!(f, "done"),
            RunStage::Failed(reached) => write!(f, "failed after {}", reached),
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub metrics: MetricSet,
    pub artifact_path: PathBuf,
    pub n_rows: usize,
    pub n_features: usize,
    pub n_train: usize,
    pub n_validation: usize,
    pub n_trees: usize,
    pub stage: RunStage,
    pub elapsed_secs: f64,
}

/// One training invocation with its injected metric sink
pub struct TrainingRun<S: MetricSink> {
    config: RunConfig,
    hyperparameters: HyperparameterConfig,
    reporter: Reporter<S>,
    stage: RunStage,
}

impl<S: MetricSink> TrainingRun<S> {
    pub fn new(config: RunConfig, hyperparameters: HyperparameterConfig, sink: S) -> Self {
        Self {
            config,
            hyperparameters,
            reporter: Reporter::new(sink),
            stage: RunStage::Init,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn hyperparameters(&self) -> &HyperparameterConfig {
        &self.hyperparameters
    }

    pub fn stage(&self) -> &RunStage {
        &self.stage
    }

    pub fn sink(&self) -> &S {
        self.reporter.sink()
    }

    pub fn into_sink(self) -> S {
        self.reporter.into_sink()
    }

    /// Load the configured dataset from `source`, then run every stage
    pub fn execute(&mut self, source: &dyn DatasetSource) -> Result<RunSummary> {
        self.ensure_fresh()?;
        let dataset = match source.load(&self.config.dataset) {
            Ok(ds) => ds,
            Err(e) => return Err(self.fail(e)),
        };
        self.execute_on(&dataset)
    }

    /// Run every stage on an already loaded dataset
    pub fn execute_on(&mut self, dataset: &Dataset) -> Result<RunSummary> {
        self.ensure_fresh()?;
        match self.drive(dataset) {
            Ok(summary) => Ok(summary),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn ensure_fresh(&self) -> Result<()> {
        if self.stage != RunStage::Init {
            return Err(HyperdriveError::ConfigError(format!(
                "run already executed (stage: {})",
                self.stage
            )));
        }
        Ok(())
    }

    fn fail(&mut self, err: HyperdriveError) -> HyperdriveError {
        error!(stage = %self.stage, error = %err, "Run failed");
        let reached = std::mem::replace(&mut self.stage, RunStage::Init);
        self.stage = RunStage::Failed(Box::new(reached));
        err
    }

    fn advance(&mut self, next: RunStage) {
        info!(from = %self.stage, to = %next, "Stage reached");
        self.stage = next;
    }

    fn drive(&mut self, dataset: &Dataset) -> Result<RunSummary> {
        let start = Instant::now();
        self.config.validate()?;

        let encoded = preprocessing::encode(dataset, &self.config.target_column)?;
        self.advance(RunStage::Encoded);

        let splitter = TrainValidationSplitter::new(self.config.validation_fraction, self.config.split_seed);
        let split = splitter.split(&encoded.x, &encoded.y)?;
        self.advance(RunStage::Split);

        let model = train(&self.hyperparameters, &split.x_train, &split.y_train)?;
        self.advance(RunStage::Trained);

        let metrics = evaluate(&model, &split.x_val, &split.y_val)?;
        self.advance(RunStage::Evaluated);

        let outcome = self
            .reporter
            .report(&self.hyperparameters, &metrics, &model, &self.config.output_dir)?;
        self.advance(RunStage::Reported);

        self.advance(RunStage::Done);

        Ok(RunSummary {
            metrics,
            artifact_path: outcome.artifact_path,
            n_rows: encoded.n_rows(),
            n_features: encoded.n_features(),
            n_train: split.indices.train.len(),
            n_validation: split.indices.validation.len(),
            n_trees: model.n_trees(),
            stage: self.stage.clone(),
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use crate::tracking::Run;

    fn dataset(target: &[&str]) -> Dataset {
        let n = target.len();
        Dataset::from_columns(vec![
            ("Dept".to_string(), (0..n).map(|i| Value::from(if i % 2 == 0 { "Sales" } else { "R&D" })).collect()),
            ("Attrition".to_string(), target.iter().map(|&t| Value::from(t)).collect()),
        ])
        .unwrap()
    }

    fn temp_config() -> RunConfig {
        RunConfig::new().with_output_dir(std::env::temp_dir().join(format!("hyperdrive_run_{}", uuid::Uuid::new_v4())))
    }

    #[test]
    fn test_schema_failure_stops_at_init() {
        let ds = dataset(&["Yes", "Yes", "Yes"]);
        let mut run = TrainingRun::new(temp_config(), HyperparameterConfig::default(), Run::new("t"));
        let err = run.execute_on(&ds).unwrap_err();
        assert!(matches!(err, HyperdriveError::SchemaError(_)));
        assert_eq!(run.stage(), &RunStage::Failed(Box::new(RunStage::Init)));
        assert!(run.sink().entries.is_empty());
    }

    #[test]
    fn test_single_class_training_side_fails_after_split() {
        // two rows split 1/1, leaving one class on the training side
        let ds = dataset(&["Yes", "No"]);
        let mut run = TrainingRun::new(temp_config(), HyperparameterConfig::default(), Run::new("t"));
        let err = run.execute_on(&ds).unwrap_err();
        assert!(matches!(err, HyperdriveError::TrainingError(_)));
        assert_eq!(run.stage(), &RunStage::Failed(Box::new(RunStage::Split)));
    }

    #[test]
    fn test_cannot_execute_twice() {
        let ds = dataset(&["Yes", "No"]);
        let mut run = TrainingRun::new(temp_config(), HyperparameterConfig::default(), Run::new("t"));
        let _ = run.execute_on(&ds);
        let err = run.execute_on(&ds).unwrap_err();
        assert!(matches!(err, HyperdriveError::ConfigError(_)));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(RunStage::Failed(Box::new(RunStage::Trained)).to_string(), "failed after trained");
    }
}
