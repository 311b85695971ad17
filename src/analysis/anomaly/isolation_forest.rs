//! Isolation forest over a single numeric feature
//!
//! Each tree isolates points by recursive random splits of a random subsample.
//! Points that need fewer splits to end up alone are more anomalous. The
//! decision threshold is the `1 - contamination` quantile of the training
//! scores, so roughly a `contamination` share of the fitted points is flagged.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::analysis::stats::quantile;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForestConfig {
    pub tree_count: usize,
    /// Upper bound on the subsample drawn for each tree
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self {
            tree_count: 100,
            max_samples: 256,
            contamination: 0.06,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum IsolationNode {
    Leaf {
        size: usize,
    },
    Split {
        threshold: f64,
        left: Box<IsolationNode>,
        right: Box<IsolationNode>,
    },
}

impl IsolationNode {
    fn build(values: &mut [f64], depth: usize, max_depth: usize, rng: &mut StdRng) -> Self {
        let size = values.len();
        if depth >= max_depth || size <= 1 {
            return Self::Leaf { size };
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if max <= min {
            return Self::Leaf { size };
        }

        let threshold = rng.gen_range(min..max);
        values.sort_by(|a, b| a.total_cmp(b));
        let split_at = values.partition_point(|&v| v <= threshold);
        let (left, right) = values.split_at_mut(split_at);

        Self::Split {
            threshold,
            left: Box::new(Self::build(left, depth + 1, max_depth, rng)),
            right: Box::new(Self::build(right, depth + 1, max_depth, rng)),
        }
    }

    /// Edges walked to reach a leaf plus the expected remaining depth there
    fn path_length(&self, value: f64) -> f64 {
        let mut node = self;
        let mut depth = 0.0;
        loop {
            match node {
                Self::Leaf { size } => return depth + average_path_length(*size),
                Self::Split {
                    threshold,
                    left,
                    right,
                } => {
                    node = if value <= *threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful search in a binary search tree of
/// `n` nodes; normalizes depths so scores are comparable across sample sizes
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// A fitted forest
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationNode>,
    sample_size: usize,
    threshold: f64,
}

impl IsolationForest {
    /// Fit on `values`; returns `None` when there is nothing to fit
    pub fn fit(values: &[f64], config: &IsolationForestConfig) -> Option<Self> {
        if values.is_empty() || config.tree_count == 0 {
            return None;
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let sample_size = config.max_samples.max(2).min(values.len());
        let max_depth = (sample_size as f64).log2().ceil().max(1.0) as usize;

        let trees = (0..config.tree_count)
            .map(|_| {
                let mut sample: Vec<f64> = values
                    .choose_multiple(&mut rng, sample_size)
                    .copied()
                    .collect();
                IsolationNode::build(&mut sample, 0, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            threshold: f64::INFINITY,
        };

        let training_scores: Vec<f64> = values.iter().map(|&v| forest.score(v)).collect();
        forest.threshold = quantile(&training_scores, 1.0 - config.contamination)
            .unwrap_or(f64::INFINITY);
        Some(forest)
    }

    /// Anomaly score in `(0, 1]`; higher means easier to isolate
    pub fn score(&self, value: f64) -> f64 {
        let normalizer = average_path_length(self.sample_size);
        if normalizer <= 0.0 {
            return 0.5;
        }
        let total: f64 = self.trees.iter().map(|t| t.path_length(value)).sum();
        let mean_depth = total / self.trees.len() as f64;
        2f64.powf(-mean_depth / normalizer)
    }

    /// Score above which a point is labeled anomalous
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_anomaly(&self, value: f64) -> bool {
        self.score(value) > self.threshold
    }

    /// Fit and label every input value in one go
    pub fn fit_predict(values: &[f64], config: &IsolationForestConfig) -> Vec<bool> {
        match Self::fit(values, config) {
            Some(forest) => values.iter().map(|&v| forest.is_anomaly(v)).collect(),
            None => vec![false; values.len()],
        }
    }
}
