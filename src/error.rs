//! Error types for a hyperdrive training run

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, HyperdriveError>;

/// Every way a training run can fail.
///
/// None of these are recovered locally: the first one raised aborts the run.
#[derive(Error, Debug)]
pub enum HyperdriveError {
    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Insufficient data: {0}")]
    InsufficientDataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Evaluation error: {0}")]
    EvaluationError(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Dataset error: {0}")]
    DatasetError(String),

    #[error("Tracking error: {0}")]
    TrackingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<polars::error::PolarsError> for HyperdriveError {
    fn from(err: polars::error::PolarsError) -> Self {
        HyperdriveError::DatasetError(err.to_string())
    }
}

impl From<bincode::Error> for HyperdriveError {
    fn from(err: bincode::Error) -> Self {
        HyperdriveError::PersistenceError(err.to_string())
    }
}

impl From<serde_json::Error> for HyperdriveError {
    fn from(err: serde_json::Error) -> Self {
        HyperdriveError::TrackingError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for HyperdriveError {
    fn from(err: ndarray::ShapeError) -> Self {
        HyperdriveError::SchemaError(format!("invalid matrix shape: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HyperdriveError::SchemaError("target column 'Attrition' is missing".to_string());
        assert_eq!(err.to_string(), "Schema error: target column 'Attrition' is missing");
    }

    #[test]
    fn test_error_from_shape() {
        let shape_err = ndarray::Array2::<f64>::from_shape_vec((2, 2), vec![1.0]).unwrap_err();
        let err: HyperdriveError = shape_err.into();
        assert!(matches!(err, HyperdriveError::SchemaError(_)));
    }

    #[test]
    fn test_error_from_bincode() {
        let bad: std::result::Result<String, bincode::Error> = bincode::deserialize(&[0xff]);
        let err: HyperdriveError = bad.unwrap_err().into();
        assert!(matches!(err, HyperdriveError::PersistenceError(_)));
    }
}
