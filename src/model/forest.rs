//! Bagged-tree ensemble.
//!
//! Bootstrap-sampled regression trees on the 0/1 target with per-tree
//! feature subsampling. The ensemble probability is the mean of the
//! per-tree leaf values, clamped to [0, 1]. All randomness flows from one
//! seeded generator, so a fixed seed reproduces the forest exactly.

use crate::error::PipelineError;
use crate::model::tree::{RegressionTree, TreeConfig};
use crate::model::{validate_fit_input, Classifier};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default number of bootstrap trees.
const DEFAULT_N_TREES: usize = 100;
/// Default depth limit per tree.
const DEFAULT_MAX_DEPTH: usize = 10;
/// Default minimum rows per leaf.
const DEFAULT_MIN_LEAF: usize = 2;

/// Bootstrap-aggregated tree ensemble
#[derive(Debug, Clone)]
pub struct BaggedForest {
    n_trees: usize,
    max_depth: usize,
    min_leaf: usize,
    seed: u64,
    trees: Vec<RegressionTree>,
}

impl BaggedForest {
    pub fn new(seed: u64) -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            max_depth: DEFAULT_MAX_DEPTH,
            min_leaf: DEFAULT_MIN_LEAF,
            seed,
            trees: Vec::new(),
        }
    }

    /// Create with explicit ensemble size and depth limit.
    pub fn with_params(n_trees: usize, max_depth: usize, seed: u64) -> Self {
        Self {
            n_trees,
            max_depth,
            min_leaf: DEFAULT_MIN_LEAF,
            seed,
            trees: Vec::new(),
        }
    }
}

impl Classifier for BaggedForest {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), PipelineError> {
        validate_fit_input(x, y)?;

        let n = x.len();
        let dim = x[0].len();
        // Square-root feature subsampling, the usual forest default
        let subsample = ((dim as f64).sqrt().round() as usize).max(1);
        let config = TreeConfig {
            max_depth: self.max_depth,
            min_leaf: self.min_leaf,
            feature_subsample: Some(subsample),
        };

        let mut rng = StdRng::seed_from_u64(self.seed);
        self.trees.clear();
        for _ in 0..self.n_trees {
            let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            self.trees.push(RegressionTree::fit(x, y, &rows, &config, &mut rng));
        }
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
        if self.trees.is_empty() {
            return Err(PipelineError::ModelFitError(
                "bagged forest not fitted".to_string(),
            ));
        }

        Ok(x.iter()
            .map(|row| {
                let sum: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
                (sum / self.trees.len() as f64).clamp(0.0, 1.0)
            })
            .collect())
    }
}
