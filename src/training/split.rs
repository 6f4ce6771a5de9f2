//! Seeded train/validation split

use crate::error::{HyperdriveError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Share of rows held out for validation
pub const DEFAULT_VALIDATION_FRACTION: f64 = 0.2;

/// Seed of the shuffling RNG
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Row indices of a single train/validation partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

/// Partitioned feature matrix and labels
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_val: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_val: Array1<f64>,
    pub indices: SplitIndices,
}

/// Shuffle-then-cut splitter (no stratification)
#[derive(Debug, Clone, Copy)]
pub struct TrainValidationSplitter {
    validation_fraction: f64,
    seed: u64,
}

impl Default for TrainValidationSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDATION_FRACTION, DEFAULT_SPLIT_SEED)
    }
}

impl TrainValidationSplitter {
    pub fn new(validation_fraction: f64, seed: u64) -> Self {
        Self {
            validation_fraction,
            seed,
        }
    }

    /// Partition `0..n_samples`.
    ///
    /// The validation side takes `ceil(fraction * n)` rows from the front of a
    /// seeded permutation; the training side takes the rest.
    pub fn indices(&self, n_samples: usize) -> Result<SplitIndices> {
        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(HyperdriveError::ConfigError(format!(
                "validation fraction must be in (0, 1), got {}",
                self.validation_fraction
            )));
        }
        if n_samples < 2 {
            return Err(HyperdriveError::InsufficientDataError(format!(
                "need at least 2 rows to split, got {}",
                n_samples
            )));
        }

        let n_val = (self.validation_fraction * n_samples as f64).ceil() as usize;
        let n_train = n_samples.saturating_sub(n_val);
        if n_val == 0 || n_train == 0 {
            return Err(HyperdriveError::InsufficientDataError(format!(
                "{} rows with validation fraction {} leaves an empty side ({} train, {} validation)",
                n_samples, self.validation_fraction, n_train, n_val
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut permutation: Vec<usize> = (0..n_samples).collect();
        permutation.shuffle(&mut rng);

        let train = permutation.split_off(n_val);
        Ok(SplitIndices {
            train,
            validation: permutation,
        })
    }

    /// Split a feature matrix and its labels
    pub fn split(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<Split> {
        if x.nrows() != y.len() {
            return Err(HyperdriveError::SchemaError(format!(
                "feature matrix has {} rows but target has {} values",
                x.nrows(),
                y.len()
            )));
        }

        let indices = self.indices(x.nrows())?;
        debug!(
            train = indices.train.len(),
            validation = indices.validation.len(),
            seed = self.seed,
            "Dataset split"
        );

        Ok(Split {
            x_train: x.select(Axis(0), &indices.train),
            x_val: x.select(Axis(0), &indices.validation),
            y_train: y.select(Axis(0), &indices.train),
            y_val: y.select(Axis(0), &indices.validation),
            indices,
        })
    }
}

/// Split `x`/`y` with an explicit fraction and seed
pub fn split(x: &Array2<f64>, y: &Array1<f64>, validation_fraction: f64, seed: u64) -> Result<Split> {
    TrainValidationSplitter::new(validation_fraction, seed).split(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 3), |(i, j)| (i * 3 + j) as f64);
        let y = Array1::from_shape_fn(n, |i| (i % 2) as f64);
        (x, y)
    }

    #[test]
    fn test_split_sizes() {
        let splitter = TrainValidationSplitter::default();
        let idx = splitter.indices(10).unwrap();
        assert_eq!(idx.train.len(), 8);
        assert_eq!(idx.validation.len(), 2);

        let idx = splitter.indices(11).unwrap();
        assert_eq!(idx.validation.len(), 3);
        assert_eq!(idx.train.len(), 8);
    }

    #[test]
    fn test_disjoint_and_covering() {
        let idx = TrainValidationSplitter::default().indices(50).unwrap();
        let train: HashSet<_> = idx.train.iter().collect();
        let val: HashSet<_> = idx.validation.iter().collect();
        assert!(train.is_disjoint(&val));
        assert_eq!(train.len() + val.len(), 50);
        assert!((0..50).all(|i| train.contains(&i) || val.contains(&i)));
    }

    #[test]
    fn test_deterministic() {
        let (x, y) = data(30);
        let a = split(&x, &y, 0.2, 42).unwrap();
        let b = split(&x, &y, 0.2, 42).unwrap();
        assert_eq!(a.indices, b.indices);
        assert_eq!(a.x_train, b.x_train);
        assert_eq!(a.y_val, b.y_val);
    }

    #[test]
    fn test_different_seed_changes_partition() {
        let a = TrainValidationSplitter::new(0.2, 42).indices(100).unwrap();
        let b = TrainValidationSplitter::new(0.2, 7).indices(100).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rows_follow_indices() {
        let (x, y) = data(10);
        let s = split(&x, &y, 0.2, 42).unwrap();
        for (pos, &row) in s.indices.validation.iter().enumerate() {
            assert_eq!(s.x_val.row(pos), x.row(row));
            assert_eq!(s.y_val[pos], y[row]);
        }
    }

    #[test]
    fn test_too_few_rows() {
        let (x, y) = data(1);
        let err = split(&x, &y, 0.2, 42).unwrap_err();
        assert!(matches!(err, HyperdriveError::InsufficientDataError(_)));
    }

    #[test]
    fn test_two_rows_split() {
        let idx = TrainValidationSplitter::default().indices(2).unwrap();
        assert_eq!(idx.train.len(), 1);
        assert_eq!(idx.validation.len(), 1);
    }

    #[test]
    fn test_invalid_fraction() {
        let err = TrainValidationSplitter::new(1.5, 42).indices(10).unwrap_err();
        assert!(matches!(err, HyperdriveError::ConfigError(_)));
    }

    #[test]
    fn test_length_mismatch() {
        let (x, _) = data(5);
        let y = Array1::zeros(4);
        assert!(matches!(split(&x, &y, 0.2, 42), Err(HyperdriveError::SchemaError(_))));
    }
}
