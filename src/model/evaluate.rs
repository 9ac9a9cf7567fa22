//! Model evaluation and production training.
//!
//! Every classifier variant is cross-validated with the same deterministic
//! fold assignment, collecting out-of-fold probabilities into one ROC
//! curve per variant. Production training fits the linear model on the
//! full training set and returns it with the exact column schema used, so
//! scoring builds matrices with identical column set and order.

use crate::config::{BOOSTING_SEED, CV_FOLDS, CV_SHUFFLE_SEED, FOREST_SEED};
use crate::error::PipelineError;
use crate::model::{BaggedForest, Classifier, GradientBoost, LogisticRegression};
use crate::types::{FeatureSchema, MemberFeatures};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;

/// ROC curve plus mean cross-validated AUC for one classifier variant.
#[derive(Debug, Clone, Serialize)]
pub struct RocSummary {
    pub false_positive_rates: Vec<f64>,
    pub true_positive_rates: Vec<f64>,
    pub mean_auc: f64,
}

/// Variant display names, in report order.
pub const VARIANT_NAMES: [&str; 3] = ["bagged_forest", "gradient_boost", "logistic_regression"];

fn variants() -> Vec<(&'static str, Box<dyn Fn() -> Box<dyn Classifier>>)> {
    vec![
        (
            "logistic_regression",
            Box::new(|| Box::new(LogisticRegression::new()) as Box<dyn Classifier>),
        ),
        (
            "bagged_forest",
            Box::new(|| Box::new(BaggedForest::new(FOREST_SEED)) as Box<dyn Classifier>),
        ),
        (
            "gradient_boost",
            Box::new(|| Box::new(GradientBoost::new(BOOSTING_SEED)) as Box<dyn Classifier>),
        ),
    ]
}

/// Deterministic shuffled fold assignment: fold id per row.
pub fn kfold_indices(n: usize, k: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut folds = vec![0; n];
    for (position, &row) in order.iter().enumerate() {
        folds[row] = position % k;
    }
    folds
}

/// ROC curve swept over descending score thresholds. Both rates start at
/// the origin; tied scores advance together.
pub fn roc_curve(labels: &[f64], scores: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let positives = labels.iter().filter(|&&v| v > 0.5).count() as f64;
    let negatives = labels.len() as f64 - positives;

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut tp = 0.0;
    let mut fp = 0.0;

    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if labels[order[i]] > 0.5 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }
        fpr.push(if negatives > 0.0 { fp / negatives } else { 0.0 });
        tpr.push(if positives > 0.0 { tp / positives } else { 0.0 });
    }

    (fpr, tpr)
}

/// Area under a curve by the trapezoidal rule.
pub fn auc(fpr: &[f64], tpr: &[f64]) -> f64 {
    let mut area = 0.0;
    for i in 1..fpr.len() {
        area += (fpr[i] - fpr[i - 1]) * (tpr[i] + tpr[i - 1]) / 2.0;
    }
    area
}

/// AUC-ROC directly from labels and scores.
pub fn roc_auc_score(labels: &[f64], scores: &[f64]) -> f64 {
    let (fpr, tpr) = roc_curve(labels, scores);
    auc(&fpr, &tpr)
}

fn labels(features: &[MemberFeatures]) -> Result<Vec<f64>, PipelineError> {
    features
        .iter()
        .map(|f| {
            f.churn.map(|c| c as f64).ok_or_else(|| {
                PipelineError::ModelFitError(format!(
                    "member {} has no churn label",
                    f.member_id
                ))
            })
        })
        .collect()
}

/// Cross-validate every classifier variant over the labeled feature rows.
///
/// Returns one [`RocSummary`] per variant, keyed by display name. Per-fold
/// AUCs are averaged; the ROC curve is built from the pooled out-of-fold
/// probabilities.
pub fn evaluate_models(
    features: &[MemberFeatures],
) -> Result<BTreeMap<String, RocSummary>, PipelineError> {
    let schema = FeatureSchema::production();
    let x = schema.matrix(features);
    let y = labels(features)?;

    if x.len() < CV_FOLDS {
        return Err(PipelineError::ModelFitError(format!(
            "{} rows is fewer than {CV_FOLDS} folds",
            x.len()
        )));
    }

    let folds = kfold_indices(x.len(), CV_FOLDS, CV_SHUFFLE_SEED);
    let mut summaries = BTreeMap::new();

    for (name, make) in variants() {
        let mut out_of_fold = vec![0.0; x.len()];
        let mut fold_aucs = Vec::with_capacity(CV_FOLDS);

        for fold in 0..CV_FOLDS {
            let train_rows: Vec<usize> = (0..x.len()).filter(|&i| folds[i] != fold).collect();
            let test_rows: Vec<usize> = (0..x.len()).filter(|&i| folds[i] == fold).collect();

            let train_x: Vec<Vec<f64>> = train_rows.iter().map(|&i| x[i].clone()).collect();
            let train_y: Vec<f64> = train_rows.iter().map(|&i| y[i]).collect();
            let test_x: Vec<Vec<f64>> = test_rows.iter().map(|&i| x[i].clone()).collect();
            let test_y: Vec<f64> = test_rows.iter().map(|&i| y[i]).collect();

            let mut model = make();
            model.fit(&train_x, &train_y)?;
            let probs = model.predict_proba(&test_x)?;

            for (&row, &p) in test_rows.iter().zip(&probs) {
                out_of_fold[row] = p;
            }
            fold_aucs.push(roc_auc_score(&test_y, &probs));
        }

        let (fpr, tpr) = roc_curve(&y, &out_of_fold);
        let mean_auc = fold_aucs.iter().sum::<f64>() / fold_aucs.len() as f64;

        summaries.insert(
            name.to_string(),
            RocSummary {
                false_positive_rates: fpr,
                true_positive_rates: tpr,
                mean_auc,
            },
        );
    }

    Ok(summaries)
}

/// Fit the production variant (the linear model) on the full training set.
pub fn train_model(
    features: &[MemberFeatures],
) -> Result<(LogisticRegression, FeatureSchema), PipelineError> {
    let schema = FeatureSchema::production();
    let x = schema.matrix(features);
    let y = labels(features)?;

    let mut model = LogisticRegression::new();
    model.fit(&x, &y)?;
    Ok((model, schema))
}

/// Coefficients zipped with their column names, sorted by absolute
/// magnitude descending.
pub fn ranked_coefficients(
    model: &LogisticRegression,
    schema: &FeatureSchema,
) -> Vec<(String, f64)> {
    let coefficients = match model.coefficients() {
        Some(coefficients) => coefficients,
        None => return Vec::new(),
    };

    let mut ranked: Vec<(String, f64)> = schema
        .names()
        .iter()
        .zip(coefficients)
        .map(|(name, &coefficient)| (name.to_string(), coefficient))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}
