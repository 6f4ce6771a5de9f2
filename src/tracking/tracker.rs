//! Run tracking
//!
//! A [`Run`] owns the identity of one training invocation and collects the
//! key/value pairs the reporter emits through [`MetricSink`].

use crate::error::{HyperdriveError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar emitted to the tracking service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<u32> for MetricValue {
    fn from(v: u32) -> Self {
        MetricValue::Int(i64::from(v))
    }
}

impl TryFrom<usize> for MetricValue {
    type Error = HyperdriveError;

    fn try_from(v: usize) -> Result<Self> {
        i64::try_from(v)
            .map(MetricValue::Int)
            .map_err(|_| HyperdriveError::TrackingError(format!("value {} does not fit a metric", v)))
    }
}

/// Anything that accepts named metric records
pub trait MetricSink {
    fn record(&mut self, name: &str, value: MetricValue) -> Result<()>;
}

impl<S: MetricSink + ?Sized> MetricSink for &mut S {
    fn record(&mut self, name: &str, value: MetricValue) -> Result<()> {
        (**self).record(name, value)
    }
}

/// One recorded key/value pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub name: String,
    pub value: MetricValue,
    pub recorded_at: DateTime<Utc>,
}

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

/// A single training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    pub run_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: RunStatus,
    /// Records in emission order
    pub entries: Vec<MetricEntry>,
    pub tags: BTreeMap<String, String>,
    pub artifacts: Vec<String>,
    pub error: Option<String>,
}

impl Run {
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            run_name: run_name.into(),
            start_time: Utc::now(),
            end_time: None,
            status: RunStatus::Running,
            entries: Vec::new(),
            tags: BTreeMap::new(),
            artifacts: Vec::new(),
            error: None,
        }
    }

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn log_artifact(&mut self, path: impl Into<String>) {
        self.artifacts.push(path.into());
    }

    /// Latest value recorded under `name`
    pub fn metric(&self, name: &str) -> Option<MetricValue> {
        self.entries.iter().rev().find(|e| e.name == name).map(|e| e.value)
    }

    /// Recorded names in emission order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn finish(&mut self) {
        self.status = RunStatus::Finished;
        self.end_time = Some(Utc::now());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error = Some(error.into());
        self.end_time = Some(Utc::now());
    }
}

impl MetricSink for Run {
    fn record(&mut self, name: &str, value: MetricValue) -> Result<()> {
        if self.status != RunStatus::Running {
            return Err(HyperdriveError::TrackingError(format!(
                "run {} is {:?}, cannot record '{}'",
                self.run_id, self.status, name
            )));
        }
        self.entries.push(MetricEntry {
            name: name.to_string(),
            value,
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_records_in_order() {
        let mut run = Run::new("hyperdrive");
        run.record("learning_rate", MetricValue::Float(0.1)).unwrap();
        run.record("n_estimators", MetricValue::Int(50)).unwrap();
        run.record("learning_rate", MetricValue::Float(0.2)).unwrap();

        assert_eq!(run.names(), vec!["learning_rate", "n_estimators", "learning_rate"]);
        assert_eq!(run.metric("learning_rate"), Some(MetricValue::Float(0.2)));
        assert_eq!(run.metric("missing"), None);
    }

    #[test]
    fn test_finished_run_rejects_records() {
        let mut run = Run::new("r");
        run.finish();
        assert_eq!(run.status, RunStatus::Finished);
        assert!(run.end_time.is_some());
        let err = run.record("accuracy", 0.5.into()).unwrap_err();
        assert!(matches!(err, HyperdriveError::TrackingError(_)));
    }

    #[test]
    fn test_fail_keeps_message() {
        let mut run = Run::new("r");
        run.fail("Schema error: boom");
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.error.as_deref(), Some("Schema error: boom"));
    }

    #[test]
    fn test_sink_through_mut_ref() {
        fn emit(mut sink: impl MetricSink) {
            sink.record("gamma", MetricValue::Float(0.0)).unwrap();
        }
        let mut run = Run::new("r");
        emit(&mut run);
        assert_eq!(run.entries.len(), 1);
    }

    #[test]
    fn test_metric_value_json() {
        assert_eq!(serde_json::to_string(&MetricValue::Int(6)).unwrap(), "6");
        assert_eq!(serde_json::to_string(&MetricValue::Float(0.3)).unwrap(), "0.3");
        assert_eq!(MetricValue::try_from(100usize).unwrap(), MetricValue::Int(100));
    }
}
