//! Regression tree model adapter.
//!
//! Axis-aligned binary tree fit by variance reduction, the classic
//! CART regressor. Hyperparameters: `max_depth` and
//! `min_samples_split`. Fitting is fully deterministic: features are
//! scanned in order and the first best split wins.

use crate::domain::error::PairtraderError;
use crate::domain::features::FEATURE_COUNT;
use crate::ports::model_port::{ModelParams, PredictiveModel};

const DEFAULT_MAX_DEPTH: usize = 8;
const DEFAULT_MIN_SAMPLES_SPLIT: usize = 2;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Default)]
pub struct RegressionTree {
    root: Option<Node>,
}

impl RegressionTree {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PredictiveModel for RegressionTree {
    fn name(&self) -> &'static str {
        "regression_tree"
    }

    fn fit(
        &mut self,
        features: &[[f64; FEATURE_COUNT]],
        targets: &[f64],
        params: &ModelParams,
    ) -> Result<(), PairtraderError> {
        if features.is_empty() || features.len() != targets.len() {
            return Err(PairtraderError::Model {
                reason: format!(
                    "cannot fit on {} feature rows and {} targets",
                    features.len(),
                    targets.len()
                ),
            });
        }

        let max_depth = usize_param(params, "max_depth", DEFAULT_MAX_DEPTH)?;
        let min_samples_split =
            usize_param(params, "min_samples_split", DEFAULT_MIN_SAMPLES_SPLIT)?.max(2);

        let indices: Vec<usize> = (0..features.len()).collect();
        self.root = Some(grow(
            features,
            targets,
            &indices,
            max_depth,
            min_samples_split,
        ));
        Ok(())
    }

    fn predict(&self, features: &[[f64; FEATURE_COUNT]]) -> Result<Vec<f64>, PairtraderError> {
        let root = self.root.as_ref().ok_or_else(|| PairtraderError::Model {
            reason: "predict called before fit".into(),
        })?;
        Ok(features.iter().map(|row| descend(root, row)).collect())
    }
}

fn usize_param(params: &ModelParams, key: &str, default: usize) -> Result<usize, PairtraderError> {
    match params.get(key) {
        None => Ok(default),
        Some(&value) if value.is_finite() && value >= 1.0 => Ok(value as usize),
        Some(&value) => Err(PairtraderError::Model {
            reason: format!("hyperparameter {key} must be a positive number, got {value}"),
        }),
    }
}

fn grow(
    features: &[[f64; FEATURE_COUNT]],
    targets: &[f64],
    indices: &[usize],
    depth_left: usize,
    min_samples_split: usize,
) -> Node {
    let mean = indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64;

    if depth_left == 0 || indices.len() < min_samples_split {
        return Node::Leaf { value: mean };
    }

    let Some((feature, threshold)) = best_split(features, targets, indices) else {
        return Node::Leaf { value: mean };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| features[i][feature] <= threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(grow(
            features,
            targets,
            &left_idx,
            depth_left - 1,
            min_samples_split,
        )),
        right: Box::new(grow(
            features,
            targets,
            &right_idx,
            depth_left - 1,
            min_samples_split,
        )),
    }
}

/// The (feature, threshold) minimizing the summed squared error of the
/// two sides, or None when no split separates the targets.
fn best_split(
    features: &[[f64; FEATURE_COUNT]],
    targets: &[f64],
    indices: &[usize],
) -> Option<(usize, f64)> {
    let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
    let n = indices.len() as f64;
    let parent_sse = total_sq - total_sum * total_sum / n;

    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..FEATURE_COUNT {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for (taken, pair) in order.windows(2).enumerate() {
            let i = pair[0];
            left_sum += targets[i];
            left_sq += targets[i] * targets[i];

            let here = features[i][feature];
            let next = features[pair[1]][feature];
            if here == next {
                continue;
            }

            let left_n = (taken + 1) as f64;
            let right_n = n - left_n;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;

            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.is_none_or(|(_, _, top)| sse < top) {
                best = Some((feature, (here + next) / 2.0, sse));
            }
        }
    }

    // Require an actual error reduction, not just any cut.
    best.filter(|&(_, _, sse)| sse < parent_sse - 1e-12)
        .map(|(feature, threshold, _)| (feature, threshold))
}

fn descend(node: &Node, row: &[f64; FEATURE_COUNT]) -> f64 {
    match node {
        Node::Leaf { value } => *value,
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] <= *threshold {
                descend(left, row)
            } else {
                descend(right, row)
            }
        }
    }
}
