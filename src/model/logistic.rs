//! L2-regularized logistic regression fitted by batch gradient descent.
//!
//! Columns are standardized internally before the descent so that
//! large-scale inputs (membership tenure in days) and binary flags share a
//! learning rate. The standardization parameters are stored with the model
//! and re-applied at prediction time, so callers always pass raw feature
//! values. Deterministic: weights start at zero and the update order is
//! fixed.

use crate::error::PipelineError;
use crate::model::{sigmoid, validate_fit_input, Classifier};

/// Default gradient-descent iteration count.
const DEFAULT_MAX_ITER: usize = 1000;
/// Default learning rate.
const DEFAULT_LEARNING_RATE: f64 = 0.1;
/// Default L2 regularization strength (not applied to the intercept).
const DEFAULT_L2: f64 = 0.01;
/// Columns with a standard deviation below this are treated as constant.
const MIN_STD: f64 = 1e-12;

#[derive(Debug, Clone)]
struct FittedState {
    /// Intercept followed by one weight per standardized column.
    weights: Vec<f64>,
    /// Per-column means from the training matrix.
    means: Vec<f64>,
    /// Per-column standard deviations; constant columns keep 1.0.
    stds: Vec<f64>,
}

/// Logistic regression over standardized inputs
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    max_iter: usize,
    learning_rate: f64,
    l2: f64,
    fitted: Option<FittedState>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
            learning_rate: DEFAULT_LEARNING_RATE,
            l2: DEFAULT_L2,
            fitted: None,
        }
    }

    /// Create with a specific iteration budget.
    pub fn with_max_iter(max_iter: usize) -> Self {
        Self {
            max_iter,
            ..Self::new()
        }
    }

    /// Fitted coefficients on standardized inputs, one per feature column,
    /// excluding the intercept. None until fitted.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|state| &state.weights[1..])
    }

    /// Fitted intercept. None until fitted.
    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|state| state.weights[0])
    }

    fn standardize(row: &[f64], means: &[f64], stds: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(means.iter().zip(stds))
            .map(|(&value, (&mean, &std))| (value - mean) / std)
            .collect()
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), PipelineError> {
        validate_fit_input(x, y)?;

        let n = x.len();
        let dim = x[0].len();

        // Column statistics for standardization
        let mut means = vec![0.0; dim];
        for row in x {
            for (j, &value) in row.iter().enumerate() {
                means[j] += value;
            }
        }
        for mean in &mut means {
            *mean /= n as f64;
        }
        let mut stds = vec![0.0; dim];
        for row in x {
            for (j, &value) in row.iter().enumerate() {
                stds[j] += (value - means[j]).powi(2);
            }
        }
        for std in &mut stds {
            *std = (*std / n as f64).sqrt();
            if *std < MIN_STD {
                *std = 1.0;
            }
        }

        let standardized: Vec<Vec<f64>> = x
            .iter()
            .map(|row| Self::standardize(row, &means, &stds))
            .collect();

        let mut weights = vec![0.0; dim + 1];
        for _ in 0..self.max_iter {
            let mut grad = vec![0.0; dim + 1];

            for (row, &target) in standardized.iter().zip(y) {
                let mut logit = weights[0];
                for (j, &value) in row.iter().enumerate() {
                    logit += weights[j + 1] * value;
                }
                let error = sigmoid(logit) - target;

                grad[0] += error;
                for (j, &value) in row.iter().enumerate() {
                    grad[j + 1] += error * value;
                }
            }

            for (j, weight) in weights.iter_mut().enumerate() {
                let penalty = if j == 0 { 0.0 } else { self.l2 * *weight };
                *weight -= self.learning_rate * (grad[j] / n as f64 + penalty);
            }
        }

        self.fitted = Some(FittedState {
            weights,
            means,
            stds,
        });
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
        let state = self.fitted.as_ref().ok_or_else(|| {
            PipelineError::ModelFitError("logistic regression not fitted".to_string())
        })?;

        Ok(x.iter()
            .map(|row| {
                let standardized = Self::standardize(row, &state.means, &state.stds);
                let mut logit = state.weights[0];
                for (j, &value) in standardized.iter().enumerate() {
                    logit += state.weights[j + 1] * value;
                }
                sigmoid(logit)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Linearly separable data on one column, with a second large-scale
    /// column that carries no signal.
    fn make_separable() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let noise = (i % 7) as f64 * 100.0;
            if i % 2 == 0 {
                x.push(vec![-1.0 - (i % 5) as f64, noise]);
                y.push(0.0);
            } else {
                x.push(vec![1.0 + (i % 5) as f64, noise]);
                y.push(1.0);
            }
        }
        (x, y)
    }

    #[test]
    fn test_separates_classes() {
        let (x, y) = make_separable();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let probs = model.predict_proba(&x).unwrap();
        for (p, &target) in probs.iter().zip(&y) {
            if target > 0.5 {
                assert!(*p > 0.5, "positive row scored {p}");
            } else {
                assert!(*p < 0.5, "negative row scored {p}");
            }
        }
    }

    #[test]
    fn test_deterministic_fit() {
        let (x, y) = make_separable();

        let mut a = LogisticRegression::new();
        let mut b = LogisticRegression::new();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.coefficients().unwrap(), b.coefficients().unwrap());
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_coefficient_direction() {
        let (x, y) = make_separable();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let coefficients = model.coefficients().unwrap();
        assert_eq!(coefficients.len(), 2);
        // The separating column gets a positive weight and dominates the
        // noise column.
        assert!(coefficients[0] > 0.0);
        assert!(coefficients[0].abs() > coefficients[1].abs());
    }

    #[test]
    fn test_unfitted_prediction_errors() {
        let model = LogisticRegression::new();
        let result = model.predict_proba(&[vec![1.0, 2.0]]);
        assert!(matches!(result, Err(PipelineError::ModelFitError(_))));
    }

    #[test]
    fn test_probabilities_in_range() {
        let (x, y) = make_separable();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        for p in model.predict_proba(&x).unwrap() {
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
