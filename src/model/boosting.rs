//! Boosted-tree ensemble.
//!
//! Stagewise shallow regression trees fitted to the gradient of the
//! logistic loss, with shrinkage and row subsampling. Predictions pass the
//! accumulated raw score through the logistic function.

use crate::error::PipelineError;
use crate::model::tree::{RegressionTree, TreeConfig};
use crate::model::{sigmoid, validate_fit_input, Classifier};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Default number of boosting stages.
const DEFAULT_N_STAGES: usize = 100;
/// Default shrinkage applied to each stage's contribution.
const DEFAULT_LEARNING_RATE: f64 = 0.1;
/// Default depth of each stage tree.
const DEFAULT_MAX_DEPTH: usize = 3;
/// Default minimum rows per leaf.
const DEFAULT_MIN_LEAF: usize = 5;
/// Default fraction of rows drawn (without replacement) per stage.
const DEFAULT_SUBSAMPLE: f64 = 0.8;

/// Gradient-boosted tree ensemble with logistic loss
#[derive(Debug, Clone)]
pub struct GradientBoost {
    n_stages: usize,
    learning_rate: f64,
    max_depth: usize,
    min_leaf: usize,
    subsample: f64,
    seed: u64,
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoost {
    pub fn new(seed: u64) -> Self {
        Self {
            n_stages: DEFAULT_N_STAGES,
            learning_rate: DEFAULT_LEARNING_RATE,
            max_depth: DEFAULT_MAX_DEPTH,
            min_leaf: DEFAULT_MIN_LEAF,
            subsample: DEFAULT_SUBSAMPLE,
            seed,
            base_score: 0.0,
            trees: Vec::new(),
        }
    }

    /// Create with explicit stage count and depth limit.
    pub fn with_params(n_stages: usize, max_depth: usize, seed: u64) -> Self {
        Self {
            n_stages,
            max_depth,
            ..Self::new(seed)
        }
    }

    fn raw_score(&self, row: &[f64]) -> f64 {
        let mut score = self.base_score;
        for tree in &self.trees {
            score += self.learning_rate * tree.predict_row(row);
        }
        score
    }
}

impl Classifier for GradientBoost {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), PipelineError> {
        validate_fit_input(x, y)?;

        let n = x.len();
        let config = TreeConfig {
            max_depth: self.max_depth,
            min_leaf: self.min_leaf,
            feature_subsample: None,
        };

        // Base score at the log-odds of the positive rate; both classes
        // are present after validation, so the odds are finite.
        let positive_rate = y.iter().sum::<f64>() / n as f64;
        self.base_score = (positive_rate / (1.0 - positive_rate)).ln();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut scores = vec![self.base_score; n];
        let sample_size = ((n as f64 * self.subsample).round() as usize).clamp(1, n);

        self.trees.clear();
        for _ in 0..self.n_stages {
            let residuals: Vec<f64> = scores
                .iter()
                .zip(y)
                .map(|(&score, &target)| target - sigmoid(score))
                .collect();

            let mut rows: Vec<usize> = (0..n).collect();
            rows.shuffle(&mut rng);
            rows.truncate(sample_size);

            let tree = RegressionTree::fit(x, &residuals, &rows, &config, &mut rng);
            for (i, row) in x.iter().enumerate() {
                scores[i] += self.learning_rate * tree.predict_row(row);
            }
            self.trees.push(tree);
        }
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
        if self.trees.is_empty() {
            return Err(PipelineError::ModelFitError(
                "gradient boosting not fitted".to_string(),
            ));
        }
        Ok(x.iter().map(|row| sigmoid(self.raw_score(row))).collect())
    }
}
