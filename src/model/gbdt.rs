//! Gradient-boosted decision trees with logistic loss.
//!
//! The model is trained in-process on the oversampled training subset and
//! published as an immutable artifact. Besides prediction, trees expose a
//! decision-path decomposition used for additive per-feature attribution: at
//! every split on an instance's path, the change in the node's expected
//! output is credited to the split feature. Summed over all trees (scaled by
//! the learning rate) the credits reconstruct the raw log-odds exactly:
//! `bias + sum(contributions) == raw_score(x)`.

use crate::error::EngineError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Maximum number of candidate thresholds evaluated per feature per node.
const MAX_SPLIT_CANDIDATES: usize = 32;

/// Leaf values are clamped to keep single trees from saturating the logit.
const MAX_LEAF_VALUE: f64 = 4.0;

#[derive(Debug, Clone)]
struct Node {
    feature: usize,
    threshold: f64,
    left: usize,
    right: usize,
    /// Expected tree output over the training samples routed through this
    /// node; for leaves this is the Newton-step output itself.
    value: f64,
    n_samples: usize,
    is_leaf: bool,
}

/// Training hyperparameters for the boosted ensemble.
#[derive(Debug, Clone)]
pub struct GbdtParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub min_samples_leaf: usize,
    /// Row subsampling fraction per tree, in (0, 1].
    pub subsample: f64,
    pub seed: u64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_trees: 150,
            max_depth: 4,
            learning_rate: 0.1,
            min_samples_leaf: 20,
            subsample: 0.9,
            seed: 42,
        }
    }
}

/// A single regression tree fit to logistic-loss gradients.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Fit a tree to the gradients/hessians of the rows in `indices`.
    fn fit(
        xs: &[Vec<f64>],
        grad: &[f64],
        hess: &[f64],
        indices: &[usize],
        max_depth: usize,
        min_samples_leaf: usize,
    ) -> Self {
        let mut tree = RegressionTree { nodes: Vec::new() };
        let root = tree.build(xs, grad, hess, indices, max_depth, min_samples_leaf);
        debug_assert_eq!(root, 0);
        tree.finalize_values(0);
        tree
    }

    fn build(
        &mut self,
        xs: &[Vec<f64>],
        grad: &[f64],
        hess: &[f64],
        indices: &[usize],
        depth_left: usize,
        min_samples_leaf: usize,
    ) -> usize {
        let node_id = self.nodes.len();
        self.nodes.push(Node {
            feature: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
            value: 0.0,
            n_samples: indices.len(),
            is_leaf: true,
        });

        let split = if depth_left == 0 || indices.len() < 2 * min_samples_leaf.max(1) {
            None
        } else {
            best_split(xs, grad, indices, min_samples_leaf)
        };

        match split {
            Some((feature, threshold)) => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .copied()
                    .partition(|&i| xs[i][feature] <= threshold);

                let left = self.build(xs, grad, hess, &left_idx, depth_left - 1, min_samples_leaf);
                let right =
                    self.build(xs, grad, hess, &right_idx, depth_left - 1, min_samples_leaf);

                let node = &mut self.nodes[node_id];
                node.feature = feature;
                node.threshold = threshold;
                node.left = left;
                node.right = right;
                node.is_leaf = false;
            }
            None => {
                self.nodes[node_id].value = newton_leaf_value(grad, hess, indices);
            }
        }

        node_id
    }

    /// Internal node values become the sample-weighted mean of their
    /// children, bottom-up, so path deltas are well defined.
    fn finalize_values(&mut self, node_id: usize) {
        if self.nodes[node_id].is_leaf {
            return;
        }
        let (left, right) = (self.nodes[node_id].left, self.nodes[node_id].right);
        self.finalize_values(left);
        self.finalize_values(right);

        let ln = self.nodes[left].n_samples as f64;
        let rn = self.nodes[right].n_samples as f64;
        let total = ln + rn;
        self.nodes[node_id].value = if total > 0.0 {
            (self.nodes[left].value * ln + self.nodes[right].value * rn) / total
        } else {
            0.0
        };
    }

    /// Unscaled tree output for one instance.
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut node = &self.nodes[0];
        while !node.is_leaf {
            node = if x[node.feature] <= node.threshold {
                &self.nodes[node.left]
            } else {
                &self.nodes[node.right]
            };
        }
        node.value
    }

    /// Expected output at the root, the tree's contribution to the baseline.
    pub fn root_value(&self) -> f64 {
        self.nodes[0].value
    }

    /// Accumulate per-feature path deltas for one instance into `out`.
    pub fn accumulate_contributions(&self, x: &[f64], scale: f64, out: &mut [f64]) {
        let mut node_id = 0;
        while !self.nodes[node_id].is_leaf {
            let node = &self.nodes[node_id];
            let child = if x[node.feature] <= node.threshold {
                node.left
            } else {
                node.right
            };
            out[node.feature] += scale * (self.nodes[child].value - node.value);
            node_id = child;
        }
    }
}

fn newton_leaf_value(grad: &[f64], hess: &[f64], indices: &[usize]) -> f64 {
    let sum_grad: f64 = indices.iter().map(|&i| grad[i]).sum();
    let sum_hess: f64 = indices.iter().map(|&i| hess[i]).sum();
    (sum_grad / (sum_hess + 1e-6)).clamp(-MAX_LEAF_VALUE, MAX_LEAF_VALUE)
}

/// Greedy best split over quantile candidate thresholds, by squared-error
/// reduction on the gradients. Returns `None` when no split improves.
fn best_split(
    xs: &[Vec<f64>],
    grad: &[f64],
    indices: &[usize],
    min_samples_leaf: usize,
) -> Option<(usize, f64)> {
    let n = indices.len();
    let n_features = xs[indices[0]].len();

    let total_sum: f64 = indices.iter().map(|&i| grad[i]).sum();
    let parent_score = total_sum * total_sum / n as f64;

    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..n_features {
        let mut pairs: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (xs[i][feature], grad[i]))
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        // Evaluate up to MAX_SPLIT_CANDIDATES evenly spaced cut positions.
        let step = (n / MAX_SPLIT_CANDIDATES).max(1);
        let mut prefix_sum = 0.0;
        let mut cursor = 0usize;

        for cut in (step..n).step_by(step) {
            while cursor < cut {
                prefix_sum += pairs[cursor].1;
                cursor += 1;
            }
            // Cannot split between identical values.
            if pairs[cut - 1].0 >= pairs[cut].0 {
                continue;
            }
            let left_n = cut;
            let right_n = n - cut;
            if left_n < min_samples_leaf || right_n < min_samples_leaf {
                continue;
            }

            let left_sum = prefix_sum;
            let right_sum = total_sum - left_sum;
            let score = left_sum * left_sum / left_n as f64
                + right_sum * right_sum / right_n as f64;
            let gain = score - parent_score;
            if gain > 1e-12 && best.map(|(_, _, g)| gain > g).unwrap_or(true) {
                let threshold = (pairs[cut - 1].0 + pairs[cut].0) / 2.0;
                best = Some((feature, threshold, gain));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

/// The trained boosted ensemble: an opaque scoring function over the
/// canonical feature vector.
#[derive(Debug, Clone)]
pub struct GbdtModel {
    trees: Vec<RegressionTree>,
    learning_rate: f64,
    /// Prior log-odds of the positive (default) class on the training data.
    base_score: f64,
    n_features: usize,
}

impl GbdtModel {
    /// Fit the ensemble on labeled rows. `ys` holds 0.0 / 1.0 outcome labels
    /// where 1.0 marks a default.
    pub fn train(xs: &[Vec<f64>], ys: &[f64], params: &GbdtParams) -> Result<Self, EngineError> {
        if xs.is_empty() || xs.len() != ys.len() {
            return Err(EngineError::Training(format!(
                "inconsistent training data: {} rows, {} labels",
                xs.len(),
                ys.len()
            )));
        }
        if !(0.0..=1.0).contains(&params.subsample) || params.subsample == 0.0 {
            return Err(EngineError::Training(format!(
                "subsample must be in (0, 1], got {}",
                params.subsample
            )));
        }

        let n = xs.len();
        let n_features = xs[0].len();

        let positive_rate = (ys.iter().sum::<f64>() / n as f64).clamp(1e-6, 1.0 - 1e-6);
        let base_score = (positive_rate / (1.0 - positive_rate)).ln();

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut raw: Vec<f64> = vec![base_score; n];
        let mut all_indices: Vec<usize> = (0..n).collect();
        let sample_size = ((n as f64 * params.subsample).round() as usize).clamp(1, n);

        let mut trees = Vec::with_capacity(params.n_trees);
        for _ in 0..params.n_trees {
            let mut grad = Vec::with_capacity(n);
            let mut hess = Vec::with_capacity(n);
            for i in 0..n {
                let p = sigmoid(raw[i]);
                grad.push(ys[i] - p);
                hess.push((p * (1.0 - p)).max(1e-6));
            }

            let indices: Vec<usize> = if sample_size < n {
                all_indices.shuffle(&mut rng);
                let mut chosen = all_indices[..sample_size].to_vec();
                chosen.sort_unstable();
                chosen
            } else {
                all_indices.clone()
            };

            let tree = RegressionTree::fit(
                xs,
                &grad,
                &hess,
                &indices,
                params.max_depth,
                params.min_samples_leaf,
            );

            for (i, row) in xs.iter().enumerate() {
                raw[i] += params.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(GbdtModel {
            trees,
            learning_rate: params.learning_rate,
            base_score,
            n_features,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Raw log-odds of default for one instance.
    pub fn raw_score(&self, x: &[f64]) -> f64 {
        let mut score = self.base_score;
        for tree in &self.trees {
            score += self.learning_rate * tree.predict(x);
        }
        score
    }

    /// Probability of default for one instance.
    pub fn predict_default_probability(&self, x: &[f64]) -> f64 {
        sigmoid(self.raw_score(x))
    }

    /// Additive decomposition of the raw score: `(bias, contributions)` with
    /// `bias + contributions.sum() == raw_score(x)`.
    ///
    /// Positive contributions push toward the default outcome.
    pub fn feature_contributions(&self, x: &[f64]) -> (f64, Vec<f64>) {
        let mut contributions = vec![0.0; self.n_features];
        let mut bias = self.base_score;
        for tree in &self.trees {
            bias += self.learning_rate * tree.root_value();
            tree.accumulate_contributions(x, self.learning_rate, &mut contributions);
        }
        (bias, contributions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_dataset() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for i in 0..40 {
            // Low feature values are good, high values default.
            xs.push(vec![i as f64 * 0.1, (i % 5) as f64]);
            ys.push(if i < 20 { 0.0 } else { 1.0 });
        }
        (xs, ys)
    }

    fn small_params() -> GbdtParams {
        GbdtParams {
            n_trees: 20,
            max_depth: 2,
            learning_rate: 0.3,
            min_samples_leaf: 2,
            subsample: 1.0,
            seed: 42,
        }
    }

    #[test]
    fn test_learns_separable_signal() {
        let (xs, ys) = separable_dataset();
        let model = GbdtModel::train(&xs, &ys, &small_params()).unwrap();

        let p_low = model.predict_default_probability(&[0.2, 1.0]);
        let p_high = model.predict_default_probability(&[3.5, 1.0]);

        assert!(p_low < 0.3, "low-risk instance got p_default {}", p_low);
        assert!(p_high > 0.7, "high-risk instance got p_default {}", p_high);
    }

    #[test]
    fn test_contributions_reconstruct_raw_score() {
        let (xs, ys) = separable_dataset();
        let model = GbdtModel::train(&xs, &ys, &small_params()).unwrap();

        for x in [&[0.3, 2.0][..], &[2.0, 0.0][..], &[3.9, 4.0][..]] {
            let (bias, contributions) = model.feature_contributions(x);
            let reconstructed = bias + contributions.iter().sum::<f64>();
            let raw = model.raw_score(x);
            assert!(
                (reconstructed - raw).abs() < 1e-9,
                "path decomposition {} != raw score {}",
                reconstructed,
                raw
            );
        }
    }

    #[test]
    fn test_training_is_deterministic() {
        let (xs, ys) = separable_dataset();
        let a = GbdtModel::train(&xs, &ys, &small_params()).unwrap();
        let b = GbdtModel::train(&xs, &ys, &small_params()).unwrap();

        let x = [1.7, 3.0];
        assert_eq!(a.raw_score(&x), b.raw_score(&x));
    }

    #[test]
    fn test_rejects_inconsistent_input() {
        let err = GbdtModel::train(&[], &[], &small_params()).unwrap_err();
        assert!(matches!(err, EngineError::Training(_)));

        let err = GbdtModel::train(&[vec![1.0]], &[1.0, 0.0], &small_params()).unwrap_err();
        assert!(matches!(err, EngineError::Training(_)));
    }
}
