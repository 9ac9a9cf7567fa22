//! Classifier variants
//!
//! The pipeline treats the classifier as a pluggable capability: anything
//! that can fit a 0/1 target and emit churn probabilities. Three variants
//! are compared during evaluation; the linear model is the production
//! choice because its coefficients feed the run report.

mod boosting;
mod forest;
mod logistic;
mod tree;

pub mod evaluate;

pub use boosting::GradientBoost;
pub use forest::BaggedForest;
pub use logistic::LogisticRegression;

use crate::error::PipelineError;

/// Binary probabilistic classifier capability.
pub trait Classifier {
    /// Fit on a design matrix and 0/1 targets.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), PipelineError>;

    /// Churn probability in [0, 1] for each row. Errors when the
    /// classifier has not been fitted.
    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError>;
}

/// Numerically stable logistic function.
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Shared fit-input validation: a fit over an empty matrix, ragged rows,
/// or a single-class label column has no defined fallback and aborts the
/// run.
pub(crate) fn validate_fit_input(x: &[Vec<f64>], y: &[f64]) -> Result<(), PipelineError> {
    if x.is_empty() {
        return Err(PipelineError::ModelFitError(
            "empty design matrix".to_string(),
        ));
    }
    if x.len() != y.len() {
        return Err(PipelineError::ModelFitError(format!(
            "{} feature rows but {} targets",
            x.len(),
            y.len()
        )));
    }
    let width = x[0].len();
    if width == 0 {
        return Err(PipelineError::ModelFitError(
            "design matrix has no columns".to_string(),
        ));
    }
    if x.iter().any(|row| row.len() != width) {
        return Err(PipelineError::ModelFitError(
            "ragged design matrix".to_string(),
        ));
    }
    let positives = y.iter().filter(|&&v| v > 0.5).count();
    if positives == 0 || positives == y.len() {
        return Err(PipelineError::ModelFitError(
            "training labels contain a single class".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_bounds() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 0.000_001);
        // No overflow at extreme logits
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
    }

    #[test]
    fn test_validate_rejects_single_class() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![1.0, 1.0];
        assert!(matches!(
            validate_fit_input(&x, &y),
            Err(PipelineError::ModelFitError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_ragged_matrix() {
        let x = vec![vec![1.0, 2.0], vec![3.0]];
        let y = vec![0.0, 1.0];
        assert!(matches!(
            validate_fit_input(&x, &y),
            Err(PipelineError::ModelFitError(_))
        ));
    }

    #[test]
    fn test_validate_accepts_two_classes() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![0.0, 1.0];
        assert!(validate_fit_input(&x, &y).is_ok());
    }
}
