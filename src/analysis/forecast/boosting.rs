//! Gradient-boosted regression trees with squared-error loss
//!
//! Each round fits a depth-limited tree to the current residuals on a random
//! subsample of rows and columns, then adds its output scaled by the learning
//! rate. Leaf weights and split gains carry an L2 penalty `lambda`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::features::{FeatureRow, FEATURE_COUNT};

#[derive(Debug, Clone, PartialEq)]
pub struct BoostingConfig {
    pub rounds: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// Share of rows drawn for each tree
    pub subsample: f64,
    /// Share of columns drawn for each tree
    pub colsample: f64,
    pub lambda: f64,
    pub seed: u64,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            rounds: 200,
            max_depth: 4,
            learning_rate: 0.07,
            subsample: 0.9,
            colsample: 0.9,
            lambda: 1.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum RegressionNode {
    Leaf {
        weight: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<RegressionNode>,
        right: Box<RegressionNode>,
    },
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionNode {
    fn predict(&self, row: &FeatureRow) -> f64 {
        let mut node = self;
        loop {
            match node {
                Self::Leaf { weight } => return *weight,
                Self::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] < *threshold { left } else { right };
                }
            }
        }
    }

    fn build(
        rows: &[FeatureRow],
        residuals: &[f64],
        indices: &[usize],
        features: &[usize],
        depth: usize,
        config: &BoostingConfig,
    ) -> Self {
        let sum: f64 = indices.iter().map(|&i| residuals[i]).sum();
        let leaf = Self::Leaf {
            weight: sum / (indices.len() as f64 + config.lambda),
        };
        if depth >= config.max_depth || indices.len() < 2 {
            return leaf;
        }

        let Some(best) = best_split(rows, residuals, indices, features, config.lambda) else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| rows[i][best.feature] < best.threshold);

        Self::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(Self::build(rows, residuals, &left, features, depth + 1, config)),
            right: Box::new(Self::build(rows, residuals, &right, features, depth + 1, config)),
        }
    }
}

fn score(sum: f64, count: usize, lambda: f64) -> f64 {
    sum * sum / (count as f64 + lambda)
}

/// Exhaustive search over midpoints between distinct sorted feature values
fn best_split(
    rows: &[FeatureRow],
    residuals: &[f64],
    indices: &[usize],
    features: &[usize],
    lambda: f64,
) -> Option<BestSplit> {
    let total: f64 = indices.iter().map(|&i| residuals[i]).sum();
    let parent = score(total, indices.len(), lambda);
    let mut best: Option<BestSplit> = None;

    for &feature in features {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

        let mut left_sum = 0.0;
        for pos in 0..order.len() - 1 {
            left_sum += residuals[order[pos]];
            let here = rows[order[pos]][feature];
            let next = rows[order[pos + 1]][feature];
            if next <= here {
                continue;
            }

            let left_count = pos + 1;
            let gain = score(left_sum, left_count, lambda)
                + score(total - left_sum, order.len() - left_count, lambda)
                - parent;
            if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(BestSplit {
                    feature,
                    threshold: (here + next) / 2.0,
                    gain,
                });
            }
        }
    }
    best
}

/// A fitted ensemble
#[derive(Debug, Clone)]
pub struct GradientBoostedTrees {
    base: f64,
    learning_rate: f64,
    trees: Vec<RegressionNode>,
}

impl GradientBoostedTrees {
    /// Fit on `rows` with targets `targets`; `None` when there are no rows or
    /// the lengths disagree
    pub fn fit(rows: &[FeatureRow], targets: &[f64], config: &BoostingConfig) -> Option<Self> {
        if rows.is_empty() || rows.len() != targets.len() {
            return None;
        }

        let n = rows.len();
        let base = targets.iter().sum::<f64>() / n as f64;
        let mut predictions = vec![base; n];
        let mut rng = StdRng::seed_from_u64(config.seed);

        let row_count = ((n as f64 * config.subsample).round() as usize).clamp(1, n);
        let column_count =
            ((FEATURE_COUNT as f64 * config.colsample).round() as usize).clamp(1, FEATURE_COUNT);
        let all_rows: Vec<usize> = (0..n).collect();
        let all_columns: Vec<usize> = (0..FEATURE_COUNT).collect();

        let mut trees = Vec::with_capacity(config.rounds);
        for _ in 0..config.rounds {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(&predictions)
                .map(|(y, p)| y - p)
                .collect();

            let mut sample: Vec<usize> = all_rows
                .choose_multiple(&mut rng, row_count)
                .copied()
                .collect();
            sample.sort_unstable();
            let mut columns: Vec<usize> = all_columns
                .choose_multiple(&mut rng, column_count)
                .copied()
                .collect();
            columns.sort_unstable();

            let tree = RegressionNode::build(rows, &residuals, &sample, &columns, 0, config);
            for (prediction, row) in predictions.iter_mut().zip(rows) {
                *prediction += config.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Some(Self {
            base,
            learning_rate: config.learning_rate,
            trees,
        })
    }

    pub fn predict(&self, row: &FeatureRow) -> f64 {
        self.base
            + self
                .trees
                .iter()
                .map(|t| self.learning_rate * t.predict(row))
                .sum::<f64>()
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}
