//! WellCo Triage - churn-risk scoring and outreach prioritization
//!
//! Triage transforms raw member activity tables into a ranked outreach
//! priority list through a deterministic pipeline: table loading → feature
//! engineering → model evaluation/training → counterfactual scoring →
//! cohort sizing → report output.
//!
//! ## Modules
//!
//! - **Feature engineering**: per-member joins and aggregates over usage,
//!   claims, and web-visit tables
//! - **Model**: pluggable classifier variants with deterministic
//!   cross-validated evaluation
//! - **Scoring/Sizing**: counterfactual outreach-benefit scoring and
//!   cohort sizing

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod scorer;
pub mod sizing;
pub mod types;

pub use dataset::{ScoringTables, TrainingTables};
pub use error::PipelineError;
pub use features::FeatureBuilder;
pub use pipeline::{
    run_end_to_end, run_scoring, run_training, score_features, train_on_features, ScoringOutcome,
    TrainedModel,
};
pub use report::{OutreachList, ReportEncoder, ScoringReport};
pub use scorer::score_members;
pub use sizing::{find_optimal_n, CohortSize};
pub use types::{FeatureColumn, FeatureSchema, MemberFeatures, ScoringResult};

/// Crate version embedded in run reports
pub const TRIAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for run reports
pub const PRODUCER_NAME: &str = "wellco-triage";
