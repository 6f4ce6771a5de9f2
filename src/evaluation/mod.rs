//! Model evaluation on the validation subset

mod metrics;

pub use metrics::{
    accuracy, roc_auc, roc_auc_weighted, round_to, MetricSet, ACCURACY, AUC_WEIGHTED, METRIC_DECIMALS,
};

use crate::error::{HyperdriveError, Result};
use crate::training::TrainedModel;
use ndarray::{Array1, Array2};
use tracing::info;

/// Score `model` on validation data.
///
/// `AUC_weighted` is computed from hard predicted labels, not
/// probabilities, so it reflects a single operating point.
pub fn evaluate(model: &TrainedModel, x_val: &Array2<f64>, y_val: &Array1<f64>) -> Result<MetricSet> {
    let positives = y_val.iter().filter(|&&v| v == 1.0).count();
    if y_val.is_empty() || positives == 0 || positives == y_val.len() {
        return Err(HyperdriveError::EvaluationError(format!(
            "validation labels need both classes ({} of {} positive)",
            positives,
            y_val.len()
        )));
    }

    let score = model.score(x_val, y_val)?;
    let predictions = model.predict(x_val)?;
    let auc = roc_auc_weighted(y_val, &predictions)?;

    let metrics = MetricSet::new(round_to(score, METRIC_DECIMALS), round_to(auc, METRIC_DECIMALS));
    info!(
        accuracy = metrics.accuracy(),
        auc_weighted = metrics.auc_weighted(),
        rows = y_val.len(),
        "Model evaluated"
    );
    Ok(metrics)
}
