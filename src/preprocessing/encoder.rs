//! Categorical encoding for features and the binary target
//!
//! Encoding is split into a `fit` step that returns plain values and a
//! `transform` step that consumes them. Nothing here is persisted.

use crate::data::{Dataset, Value};
use crate::error::{HyperdriveError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Fitted label encoder: sorted distinct target values.
///
/// The position of a class in `classes` is its integer code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<Value>,
}

impl LabelEncoder {
    /// Collect the sorted distinct values
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let classes: BTreeSet<Value> = values.into_iter().cloned().collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn classes(&self) -> &[Value] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Integer code of a class, if it was seen during fit
    pub fn code(&self, value: &Value) -> Option<usize> {
        self.classes.binary_search(value).ok()
    }

    /// Map every value to its code; unseen labels are a schema error
    pub fn transform<'a>(&self, values: impl IntoIterator<Item = &'a Value>) -> Result<Array1<f64>> {
        values
            .into_iter()
            .map(|v| {
                self.code(v).map(|c| c as f64).ok_or_else(|| {
                    HyperdriveError::SchemaError(format!("unseen target label '{}'", v))
                })
            })
            .collect::<Result<Vec<f64>>>()
            .map(Array1::from_vec)
    }

    /// Original label for a code
    pub fn inverse(&self, code: usize) -> Option<&Value> {
        self.classes.get(code)
    }
}

/// Categories observed for one feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCategories {
    pub name: String,
    pub categories: Vec<Value>,
}

/// Fitted one-hot encoder over a set of feature columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    features: Vec<FeatureCategories>,
}

impl OneHotEncoder {
    /// Fit on the named columns of `dataset`, treating every value as a category
    pub fn fit(dataset: &Dataset, columns: &[&str]) -> Result<Self> {
        let features = columns
            .iter()
            .map(|&name| {
                let idx = dataset
                    .column_index(name)
                    .ok_or_else(|| HyperdriveError::SchemaError(format!("feature column '{}' not found", name)))?;
                let categories: BTreeSet<Value> = dataset.column_values(idx).cloned().collect();
                Ok(FeatureCategories {
                    name: name.to_string(),
                    categories: categories.into_iter().collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { features })
    }

    pub fn features(&self) -> &[FeatureCategories] {
        &self.features
    }

    /// Width of the encoded matrix
    pub fn n_outputs(&self) -> usize {
        self.features.iter().map(|f| f.categories.len()).sum()
    }

    /// Output column names, `<column>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        self.features
            .iter()
            .flat_map(|f| f.categories.iter().map(move |c| format!("{}_{}", f.name, c)))
            .collect()
    }

    /// Expand `dataset` into a dense 0/1 matrix.
    ///
    /// Categories not seen during fit leave their column block all zero.
    pub fn transform(&self, dataset: &Dataset) -> Result<Array2<f64>> {
        let mut x = Array2::<f64>::zeros((dataset.n_rows(), self.n_outputs()));
        let mut offset = 0;

        for feature in &self.features {
            let idx = dataset.column_index(&feature.name).ok_or_else(|| {
                HyperdriveError::SchemaError(format!("feature column '{}' not found", feature.name))
            })?;

            for (row, value) in dataset.column_values(idx).enumerate() {
                if let Ok(pos) = feature.categories.binary_search(value) {
                    x[[row, offset + pos]] = 1.0;
                }
            }
            offset += feature.categories.len();
        }

        Ok(x)
    }
}

/// Both fitted encoders for one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedEncoders {
    pub target: String,
    pub labels: LabelEncoder,
    pub features: OneHotEncoder,
}

/// Encoded feature matrix with its aligned target vector
#[derive(Debug, Clone)]
pub struct EncodedData {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub feature_names: Vec<String>,
    pub classes: Vec<Value>,
}

impl EncodedData {
    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

/// Fit the label encoder on `target` and the one-hot encoder on every other column
pub fn fit(dataset: &Dataset, target: &str) -> Result<FittedEncoders> {
    let target_idx = dataset
        .column_index(target)
        .ok_or_else(|| HyperdriveError::SchemaError(format!("target column '{}' is missing", target)))?;

    if dataset.column_values(target_idx).any(Value::is_missing) {
        return Err(HyperdriveError::SchemaError(format!(
            "target column '{}' contains missing values",
            target
        )));
    }

    let labels = LabelEncoder::fit(dataset.column_values(target_idx));
    if labels.n_classes() != 2 {
        return Err(HyperdriveError::SchemaError(format!(
            "target column '{}' must have exactly two distinct values, found {}",
            target,
            labels.n_classes()
        )));
    }

    let feature_columns: Vec<&str> = dataset
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|&c| c != target)
        .collect();
    if feature_columns.is_empty() {
        return Err(HyperdriveError::SchemaError(
            "dataset has no feature columns".to_string(),
        ));
    }

    let features = OneHotEncoder::fit(dataset, &feature_columns)?;
    debug!(
        classes = ?labels.classes(),
        feature_columns = feature_columns.len(),
        encoded_width = features.n_outputs(),
        "Encoders fitted"
    );

    Ok(FittedEncoders {
        target: target.to_string(),
        labels,
        features,
    })
}

/// Apply fitted encoders to a dataset
pub fn transform(fitted: &FittedEncoders, dataset: &Dataset) -> Result<EncodedData> {
    let target_idx = dataset.column_index(&fitted.target).ok_or_else(|| {
        HyperdriveError::SchemaError(format!("target column '{}' is missing", fitted.target))
    })?;

    let y = fitted.labels.transform(dataset.column_values(target_idx))?;
    let x = fitted.features.transform(dataset)?;

    Ok(EncodedData {
        x,
        y,
        feature_names: fitted.features.feature_names(),
        classes: fitted.labels.classes().to_vec(),
    })
}

/// Fit both encoders on `dataset` and transform it in one pass
pub fn encode(dataset: &Dataset, target: &str) -> Result<EncodedData> {
    let fitted = fit(dataset, target)?;
    transform(&fitted, dataset)
}
