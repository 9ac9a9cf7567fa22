//! Run reporting and outreach-list output
//!
//! Encodes a finished run into its two output surfaces: the outreach list
//! CSV handed to the outreach team, and a JSON run report with producer
//! provenance for downstream tooling.

use crate::config::CHURN_PROB_THRESHOLD;
use crate::error::PipelineError;
use crate::model::evaluate::ranked_coefficients;
use crate::pipeline::{ScoringOutcome, TrainedModel};
use crate::types::ScoringResult;
use crate::{PRODUCER_NAME, TRIAGE_VERSION};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Ranked members selected for outreach.
#[derive(Debug, Clone)]
pub struct OutreachList {
    pub members: Vec<ScoringResult>,
}

impl OutreachList {
    /// Keep members above the churn-probability threshold and re-rank the
    /// filtered subset 1..k. Expects results already sorted by
    /// prioritization score, as the scorer returns them.
    pub fn from_results(results: &[ScoringResult]) -> Self {
        let mut members: Vec<ScoringResult> = results
            .iter()
            .filter(|r| r.churn_prob_no_outreach > CHURN_PROB_THRESHOLD)
            .cloned()
            .collect();
        for (position, member) in members.iter_mut().enumerate() {
            member.rank = position + 1;
        }
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Write as CSV with the outreach-team column contract.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PipelineError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for member in &self.members {
            csv_writer.serialize(member)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Persist as `outreach_list.csv` under `dir`, creating the directory
    /// if needed. Returns the written path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, PipelineError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join("outreach_list.csv");
        let file = std::fs::File::create(&path)?;
        self.write_csv(file)?;
        Ok(path)
    }
}

/// Producer metadata embedded in every run report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// One fitted coefficient, named after its feature column.
#[derive(Debug, Clone, Serialize)]
pub struct CoefficientEntry {
    pub feature: String,
    pub coefficient: f64,
}

/// JSON summary of one end-to-end run.
#[derive(Debug, Clone, Serialize)]
pub struct ScoringReport {
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub scored_members: usize,
    pub outreach_members: usize,
    pub optimal_n: usize,
    pub churn_prob_threshold: f64,
    /// Mean cross-validated AUC per classifier variant.
    pub evaluation: BTreeMap<String, f64>,
    /// Production-model coefficients, largest magnitude first.
    pub coefficients: Vec<CoefficientEntry>,
}

/// Report encoder carrying the run's instance id
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a finished run into a report payload.
    pub fn encode(&self, trained: &TrainedModel, outcome: &ScoringOutcome) -> ScoringReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: TRIAGE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let evaluation: BTreeMap<String, f64> = trained
            .evaluation
            .iter()
            .map(|(name, summary)| (name.clone(), summary.mean_auc))
            .collect();

        let coefficients = ranked_coefficients(&trained.model, &trained.schema)
            .into_iter()
            .map(|(feature, coefficient)| CoefficientEntry {
                feature,
                coefficient,
            })
            .collect();

        ScoringReport {
            producer,
            computed_at_utc: Utc::now().to_rfc3339(),
            scored_members: outcome.results.len(),
            outreach_members: outcome.outreach.len(),
            optimal_n: outcome.cohort.optimal_n,
            churn_prob_threshold: CHURN_PROB_THRESHOLD,
            evaluation,
            coefficients,
        }
    }

    /// Encode to pretty-printed JSON.
    pub fn encode_to_json(
        &self,
        trained: &TrainedModel,
        outcome: &ScoringOutcome,
    ) -> Result<String, PipelineError> {
        let report = self.encode(trained, outcome);
        serde_json::to_string_pretty(&report).map_err(PipelineError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(id: usize, prob_no: f64) -> ScoringResult {
        ScoringResult {
            member_id: format!("M{id}"),
            has_e11_9: 1,
            has_i10: 0,
            has_z71_3: 0,
            churn_prob_no_outreach: prob_no,
            churn_prob_with_outreach: prob_no - 0.1,
            outreach_benefit: 0.1,
            model_score: prob_no * 0.1,
            icd_boost: 0.05,
            prioritization_score: prob_no * 0.1 + 0.05,
            rank: id + 1,
        }
    }

    #[test]
    fn test_outreach_list_filters_and_reranks() {
        let results = vec![
            make_result(0, 0.9),
            make_result(1, 0.2),
            make_result(2, 0.5),
            make_result(3, 0.1),
        ];

        let list = OutreachList::from_results(&results);

        assert_eq!(list.len(), 2);
        assert_eq!(list.members[0].member_id, "M0");
        assert_eq!(list.members[0].rank, 1);
        assert_eq!(list.members[1].member_id, "M2");
        assert_eq!(list.members[1].rank, 2);
    }

    #[test]
    fn test_outreach_list_can_be_empty() {
        let results = vec![make_result(0, 0.1), make_result(1, 0.05)];
        let list = OutreachList::from_results(&results);
        assert!(list.is_empty());
    }

    #[test]
    fn test_csv_column_contract() {
        let list = OutreachList::from_results(&[make_result(0, 0.9)]);

        let mut buffer = Vec::new();
        list.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "member_id,has_E11_9,has_I10,has_Z71_3,churn_prob_no_outreach,\
             churn_prob_with_outreach,outreach_benefit,model_score,icd_boost,\
             prioritization_score,rank"
        );
        assert_eq!(text.lines().count(), 2);
    }
}
