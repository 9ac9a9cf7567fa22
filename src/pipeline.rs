//! Pipeline orchestration
//!
//! This module provides the public API for WellCo Triage.
//! It ties the stages together: table loading → feature engineering →
//! model evaluation/training → counterfactual scoring → cohort sizing →
//! report output.

use crate::dataset::{ScoringTables, TrainingTables};
use crate::error::PipelineError;
use crate::features::FeatureBuilder;
use crate::model::evaluate::{self, RocSummary};
use crate::model::LogisticRegression;
use crate::report::{OutreachList, ReportEncoder, ScoringReport};
use crate::scorer::score_members;
use crate::sizing::{find_optimal_n, CohortSize};
use crate::types::{FeatureSchema, MemberFeatures, ScoringResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Production model plus everything training produced alongside it.
#[derive(Debug)]
pub struct TrainedModel {
    pub model: LogisticRegression,
    /// Column schema the model was fitted on; scoring reuses it verbatim.
    pub schema: FeatureSchema,
    /// Cross-validation summary per classifier variant.
    pub evaluation: BTreeMap<String, RocSummary>,
}

/// Outcome of scoring one unlabeled cohort.
#[derive(Debug)]
pub struct ScoringOutcome {
    /// All scored members, ranked by prioritization score.
    pub results: Vec<ScoringResult>,
    pub cohort: CohortSize,
    /// Members above the churn-probability threshold, re-ranked.
    pub outreach: OutreachList,
}

/// Load the training tables from a directory and fit the production
/// model, cross-validating all variants along the way.
pub fn run_training(train_dir: &Path) -> Result<TrainedModel, PipelineError> {
    let tables = TrainingTables::load_from_dir(train_dir)?;
    let features = FeatureBuilder::build_training(&tables)?;
    train_on_features(&features)
}

/// Evaluate and train over pre-built labeled feature rows.
pub fn train_on_features(features: &[MemberFeatures]) -> Result<TrainedModel, PipelineError> {
    let evaluation = evaluate::evaluate_models(features)?;
    let (model, schema) = evaluate::train_model(features)?;
    Ok(TrainedModel {
        model,
        schema,
        evaluation,
    })
}

/// Load the scoring tables from a directory and score the cohort.
pub fn run_scoring(
    trained: &TrainedModel,
    score_dir: &Path,
) -> Result<ScoringOutcome, PipelineError> {
    let tables = ScoringTables::load_from_dir(score_dir)?;
    let features = FeatureBuilder::build_scoring(&tables)?;
    score_features(trained, &features)
}

/// Score pre-built unlabeled feature rows and size the outreach cohort.
pub fn score_features(
    trained: &TrainedModel,
    features: &[MemberFeatures],
) -> Result<ScoringOutcome, PipelineError> {
    let results = score_members(&trained.model, &trained.schema, features)?;
    let cohort = find_optimal_n(&results);
    let outreach = OutreachList::from_results(&results);
    Ok(ScoringOutcome {
        results,
        cohort,
        outreach,
    })
}

/// One-shot end-to-end run mirroring the production batch job.
///
/// Writes `outreach_list.csv` and `run_report.json` under `out_dir` and
/// returns the report.
pub fn run_end_to_end(
    train_dir: &Path,
    score_dir: &Path,
    out_dir: &Path,
) -> Result<ScoringReport, PipelineError> {
    let trained = run_training(train_dir)?;
    let outcome = run_scoring(&trained, score_dir)?;

    outcome.outreach.save(out_dir)?;

    let encoder = ReportEncoder::new();
    let report = encoder.encode(&trained, &outcome);
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(out_dir.join("run_report.json"), json)?;

    Ok(report)
}
