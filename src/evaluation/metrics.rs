//! Validation metrics
//!
//! AUC uses the Mann-Whitney rank statistic with tied scores sharing their
//! average rank, so hard 0/1 predictions give a meaningful (if coarse) value.

use crate::error::{HyperdriveError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub const ACCURACY: &str = "accuracy";
pub const AUC_WEIGHTED: &str = "AUC_weighted";

/// Decimal places kept for reported metrics
pub const METRIC_DECIMALS: i32 = 3;

/// Round half to even at `decimals` places, matching numpy's `round`
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Fraction of positions where prediction and truth agree
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Binary ROC AUC of `scores` against 0/1 labels
pub fn roc_auc(y_true: &Array1<f64>, scores: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, scores)?;
    let labels: Vec<bool> = y_true.iter().map(|&v| v == 1.0).collect();
    auc_from_ranks(&labels, scores.to_vec())
}

/// One-vs-rest ROC AUC averaged with class-support weights.
///
/// For two classes both one-vs-rest curves are mirror images, so the result
/// equals [`roc_auc`].
pub fn roc_auc_weighted(y_true: &Array1<f64>, scores: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, scores)?;
    let n = y_true.len() as f64;
    let mut total = 0.0;

    for class in [0.0, 1.0] {
        let labels: Vec<bool> = y_true.iter().map(|&v| v == class).collect();
        let support = labels.iter().filter(|&&l| l).count() as f64;
        let class_scores: Vec<f64> = if class == 1.0 {
            scores.to_vec()
        } else {
            scores.iter().map(|s| 1.0 - s).collect()
        };
        total += support / n * auc_from_ranks(&labels, class_scores)?;
    }

    Ok(total)
}

fn auc_from_ranks(labels: &[bool], scores: Vec<f64>) -> Result<f64> {
    let n = labels.len();
    let n_pos = labels.iter().filter(|&&l| l).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(HyperdriveError::EvaluationError(
            "ROC AUC is undefined when only one class is present".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // sum of ascending ranks of the positives, ties share their average rank
    let mut rank_sum_pos = 0.0f64;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && scores[order[j]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        rank_sum_pos += avg_rank * order[i..j].iter().filter(|&&idx| labels[idx]).count() as f64;
        i = j;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Ok((rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

fn check_lengths(a: &Array1<f64>, b: &Array1<f64>) -> Result<()> {
    if a.is_empty() {
        return Err(HyperdriveError::EvaluationError("no samples to evaluate".to_string()));
    }
    if a.len() != b.len() {
        return Err(HyperdriveError::EvaluationError(format!(
            "length mismatch: {} labels vs {} predictions",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

/// Validation metrics of one run, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    accuracy: f64,
    #[serde(rename = "AUC_weighted")]
    auc_weighted: f64,
}

impl MetricSet {
    pub fn new(accuracy: f64, auc_weighted: f64) -> Self {
        Self {
            accuracy,
            auc_weighted,
        }
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn auc_weighted(&self) -> f64 {
        self.auc_weighted
    }

    /// `(name, value)` pairs: accuracy first, then AUC_weighted
    pub fn entries(&self) -> [(&'static str, f64); 2] {
        [(ACCURACY, self.accuracy), (AUC_WEIGHTED, self.auc_weighted)]
    }
}
