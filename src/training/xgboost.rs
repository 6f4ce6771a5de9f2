//! XGBoost-style gradient boosted trees for binary classification
//!
//! - Logistic loss with second-order approximation: g = p - y, h = p(1 - p)
//! - Regularized leaf weights: w* = -T(G, alpha) / (H + lambda)
//! - Split gain: T(GL)²/(HL+λ) + T(GR)²/(HR+λ) - T(G)²/(H+λ), kept only when > gamma
//! - Minimum child weight on both sides of a split
//! - Row subsampling and per-tree column subsampling from a seeded RNG
//!
//! Split search is exact greedy over a column index that stores only the
//! non-zero entries of each feature, so one-hot input costs little per node.

use crate::error::{HyperdriveError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Booster configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XGBoostConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub reg_lambda: f64,
    /// L1 regularization on leaf weights
    pub reg_alpha: f64,
    /// Minimum loss reduction to make a split
    pub gamma: f64,
    pub subsample: f64,
    pub colsample_bytree: f64,
    pub random_state: u64,
}

impl Default for XGBoostConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            reg_alpha: 0.0,
            gamma: 0.0,
            subsample: 1.0,
            colsample_bytree: 1.0,
            random_state: 0,
        }
    }
}

/// A single node in a boosted tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        weight: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        gain: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, sample: ArrayView1<f64>) -> f64 {
        match self {
            TreeNode::Leaf { weight } => *weight,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                if sample[*feature] <= *threshold {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }

    /// Number of leaves below (and including) this node
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Non-zero entries of every feature, sorted by value
struct ColumnIndex {
    columns: Vec<Vec<(usize, f64)>>,
}

impl ColumnIndex {
    fn build(x: &Array2<f64>) -> Self {
        let columns = (0..x.ncols())
            .into_par_iter()
            .map(|f| {
                let mut entries: Vec<(usize, f64)> = x
                    .column(f)
                    .iter()
                    .enumerate()
                    .filter(|(_, &v)| v != 0.0)
                    .map(|(row, &v)| (row, v))
                    .collect();
                entries.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
                entries
            })
            .collect();
        Self { columns }
    }
}

/// Read-only state shared by every node of one tree
struct TreeContext<'a> {
    x: &'a Array2<f64>,
    columns: &'a ColumnIndex,
    grad: &'a [f64],
    hess: &'a [f64],
    features: &'a [usize],
    config: &'a XGBoostConfig,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Soft-threshold of the gradient sum by the L1 term
fn threshold_l1(g: f64, alpha: f64) -> f64 {
    if g > alpha {
        g - alpha
    } else if g < -alpha {
        g + alpha
    } else {
        0.0
    }
}

/// Optimal leaf weight with L1 (alpha) and L2 (lambda) regularization
fn leaf_weight(g_sum: f64, h_sum: f64, lambda: f64, alpha: f64) -> f64 {
    let denom = h_sum + lambda;
    if denom == 0.0 {
        return 0.0;
    }
    -threshold_l1(g_sum, alpha) / denom
}

/// Structure score of a node
fn node_score(g_sum: f64, h_sum: f64, lambda: f64, alpha: f64) -> f64 {
    let denom = h_sum + lambda;
    if denom == 0.0 {
        return 0.0;
    }
    let t = threshold_l1(g_sum, alpha);
    t * t / denom
}

fn build_tree(ctx: &TreeContext, rows: &[usize], depth: usize) -> TreeNode {
    let cfg = ctx.config;
    let g_sum: f64 = rows.iter().map(|&i| ctx.grad[i]).sum();
    let h_sum: f64 = rows.iter().map(|&i| ctx.hess[i]).sum();
    let weight = leaf_weight(g_sum, h_sum, cfg.reg_lambda, cfg.reg_alpha);

    if depth >= cfg.max_depth || rows.len() < 2 || h_sum < cfg.min_child_weight {
        return TreeNode::Leaf { weight };
    }

    let mut in_node = vec![false; ctx.x.nrows()];
    for &r in rows {
        in_node[r] = true;
    }

    let candidates: Vec<SplitCandidate> = ctx
        .features
        .par_iter()
        .filter_map(|&f| best_split_for_feature(ctx, &in_node, rows.len(), g_sum, h_sum, f))
        .collect();

    // first best wins, keeping the tree independent of thread scheduling
    let best = candidates.into_iter().fold(None, |acc: Option<SplitCandidate>, c| match acc {
        Some(b) if b.gain >= c.gain => Some(b),
        _ => Some(c),
    });

    match best {
        Some(split) if split.gain > cfg.gamma && split.gain > 0.0 => {
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .partition(|&&i| ctx.x[[i, split.feature]] <= split.threshold);

            if left_rows.is_empty() || right_rows.is_empty() {
                return TreeNode::Leaf { weight };
            }

            let left = build_tree(ctx, &left_rows, depth + 1);
            let right = build_tree(ctx, &right_rows, depth + 1);

            TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                gain: split.gain,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        _ => TreeNode::Leaf { weight },
    }
}

/// Exact greedy scan of one feature.
///
/// Rows whose value is zero are not stored in the column index; their
/// statistics are the node totals minus the non-zero sums, inserted at the
/// position of 0.0 in value order.
fn best_split_for_feature(
    ctx: &TreeContext,
    in_node: &[bool],
    n_node: usize,
    g_total: f64,
    h_total: f64,
    feature: usize,
) -> Option<SplitCandidate> {
    let cfg = ctx.config;

    // (value, grad sum, hess sum)
    let mut groups: Vec<(f64, f64, f64)> = Vec::new();
    let mut g_nz = 0.0;
    let mut h_nz = 0.0;
    let mut n_nz = 0usize;

    for &(row, value) in &ctx.columns.columns[feature] {
        if !in_node[row] {
            continue;
        }
        let (g, h) = (ctx.grad[row], ctx.hess[row]);
        g_nz += g;
        h_nz += h;
        n_nz += 1;
        match groups.last_mut() {
            Some(last) if last.0 == value => {
                last.1 += g;
                last.2 += h;
            }
            _ => groups.push((value, g, h)),
        }
    }

    if n_nz < n_node {
        let pos = groups.partition_point(|g| g.0 < 0.0);
        groups.insert(pos, (0.0, g_total - g_nz, h_total - h_nz));
    }

    if groups.len() < 2 {
        return None;
    }

    let parent = node_score(g_total, h_total, cfg.reg_lambda, cfg.reg_alpha);
    let mut g_left = 0.0;
    let mut h_left = 0.0;
    let mut best: Option<SplitCandidate> = None;

    for pair in groups.windows(2) {
        g_left += pair[0].1;
        h_left += pair[0].2;
        let g_right = g_total - g_left;
        let h_right = h_total - h_left;

        if h_left < cfg.min_child_weight || h_right < cfg.min_child_weight {
            continue;
        }

        let gain = node_score(g_left, h_left, cfg.reg_lambda, cfg.reg_alpha)
            + node_score(g_right, h_right, cfg.reg_lambda, cfg.reg_alpha)
            - parent;

        if best.map_or(true, |b| gain > b.gain) {
            best = Some(SplitCandidate {
                feature,
                threshold: (pair[0].0 + pair[1].0) / 2.0,
                gain,
            });
        }
    }

    best
}

/// Draw `ceil(n * ratio)` sorted indices (at least one, at most `n`)
fn subsample(rng: &mut Xoshiro256PlusPlus, n: usize, ratio: f64) -> Vec<usize> {
    if ratio >= 1.0 || n == 0 {
        return (0..n).collect();
    }
    let k = ((n as f64) * ratio).ceil().max(1.0) as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(k.min(n));
    indices.sort_unstable();
    indices
}

// ─── XGBoost Classifier ────────────────────────────────────────────────────

/// Binary XGBoost classifier over 0/1 labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XGBoostClassifier {
    config: XGBoostConfig,
    trees: Vec<TreeNode>,
    base_score: f64,
    n_features: usize,
}

impl XGBoostClassifier {
    pub fn new(config: XGBoostConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score: 0.0,
            n_features: 0,
        }
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    pub fn config(&self) -> &XGBoostConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[TreeNode] {
        &self.trees
    }

    /// Fit on a 0/1 label vector. Both classes must be present.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples == 0 {
            return Err(HyperdriveError::TrainingError("training data is empty".to_string()));
        }
        if y.len() != n_samples {
            return Err(HyperdriveError::TrainingError(format!(
                "feature matrix has {} rows but labels have {} values",
                n_samples,
                y.len()
            )));
        }
        if let Some(bad) = y.iter().find(|&&v| v != 0.0 && v != 1.0) {
            return Err(HyperdriveError::TrainingError(format!(
                "labels must be 0 or 1, found {}",
                bad
            )));
        }
        let positives = y.iter().filter(|&&v| v == 1.0).count();
        if positives == 0 || positives == n_samples {
            return Err(HyperdriveError::TrainingError(
                "training labels contain a single class".to_string(),
            ));
        }

        self.n_features = n_features;

        // Base score in log-odds space
        let p = (positives as f64 / n_samples as f64).clamp(1e-7, 1.0 - 1e-7);
        self.base_score = (p / (1.0 - p)).ln();
        let mut raw_preds = Array1::from_elem(n_samples, self.base_score);

        let columns = ColumnIndex::build(x);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);

        self.trees.clear();

        for _ in 0..self.config.n_estimators {
            // Logistic loss: grad = p - y, hess = p * (1 - p)
            let probs: Array1<f64> = raw_preds.mapv(Self::sigmoid);
            let grad: Vec<f64> = probs.iter().zip(y.iter()).map(|(p, t)| p - t).collect();
            let hess: Vec<f64> = probs.iter().map(|p| (p * (1.0 - p)).max(1e-16)).collect();

            let row_indices = subsample(&mut rng, n_samples, self.config.subsample);
            let col_indices = subsample(&mut rng, n_features, self.config.colsample_bytree);

            let ctx = TreeContext {
                x,
                columns: &columns,
                grad: &grad,
                hess: &hess,
                features: &col_indices,
                config: &self.config,
            };
            let tree = build_tree(&ctx, &row_indices, 0);

            for (i, row) in x.rows().into_iter().enumerate() {
                raw_preds[i] += self.config.learning_rate * tree.predict(row);
            }

            self.trees.push(tree);
        }

        if !self.base_score.is_finite() || raw_preds.iter().any(|v| !v.is_finite()) {
            return Err(HyperdriveError::TrainingError(
                "boosting produced non-finite margins".to_string(),
            ));
        }

        Ok(())
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(HyperdriveError::SchemaError(format!(
                "model expects {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }
        Ok(())
    }

    /// Raw margins (log-odds)
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_width(x)?;
        let margins = x
            .rows()
            .into_iter()
            .map(|row| {
                self.trees
                    .iter()
                    .fold(self.base_score, |acc, tree| acc + self.config.learning_rate * tree.predict(row))
            })
            .collect();
        Ok(margins)
    }

    /// Probability of class 1
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(Self::sigmoid))
    }

    /// Hard 0/1 predictions; class 1 when its probability exceeds 0.5
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let probs = self.predict_proba(x)?;
        Ok(probs.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    /// Mean accuracy of hard predictions
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        if y.is_empty() || y.len() != x.nrows() {
            return Err(HyperdriveError::EvaluationError(format!(
                "cannot score {} rows against {} labels",
                x.nrows(),
                y.len()
            )));
        }
        let preds = self.predict(x)?;
        let correct = preds
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count();
        Ok(correct as f64 / y.len() as f64)
    }

    /// Split-count importances, normalised to sum to one
    pub fn feature_importances(&self) -> Option<Array1<f64>> {
        if self.n_features == 0 {
            return None;
        }
        let mut counts = vec![0.0f64; self.n_features];
        for tree in &self.trees {
            count_splits(tree, &mut counts);
        }
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            for c in counts.iter_mut() {
                *c /= total;
            }
        }
        Some(Array1::from_vec(counts))
    }
}

fn count_splits(node: &TreeNode, counts: &mut [f64]) {
    if let TreeNode::Split {
        feature, left, right, ..
    } = node
    {
        if let Some(c) = counts.get_mut(*feature) {
            *c += 1.0;
        }
        count_splits(left, counts);
        count_splits(right, counts);
    }
}
