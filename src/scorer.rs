//! Counterfactual scoring
//!
//! For each member the fitted classifier answers two questions: how likely
//! is churn with no outreach, and how likely with outreach. The gap is the
//! benefit outreach is expected to buy for that member; it is combined
//! with the no-outreach risk and the priority-diagnosis boost into one
//! prioritization score used for ranking.

use crate::config::ICD_BOOST_WEIGHT;
use crate::error::PipelineError;
use crate::model::Classifier;
use crate::types::{FeatureSchema, MemberFeatures, ScoringResult};

/// Score the unlabeled cohort and rank members by prioritization score.
///
/// Both counterfactual matrices are built through the training schema, so
/// the classifier sees exactly the column set and order it was fitted on.
/// The sort is stable: members with equal scores keep their input order.
pub fn score_members(
    model: &dyn Classifier,
    schema: &FeatureSchema,
    features: &[MemberFeatures],
) -> Result<Vec<ScoringResult>, PipelineError> {
    let without_outreach = schema.matrix_with_outreach(features, 0.0);
    let with_outreach = schema.matrix_with_outreach(features, 1.0);

    let prob_no_outreach = model.predict_proba(&without_outreach)?;
    let prob_with_outreach = model.predict_proba(&with_outreach)?;

    let mut results: Vec<ScoringResult> = features
        .iter()
        .zip(prob_no_outreach.iter().zip(&prob_with_outreach))
        .map(|(member, (&p_no, &p_with))| {
            let outreach_benefit = p_no - p_with;
            let model_score = p_no * outreach_benefit;
            let icd_boost = ICD_BOOST_WEIGHT * member.priority_flag_count() as f64;

            ScoringResult {
                member_id: member.member_id.clone(),
                has_e11_9: member.has_e11_9,
                has_i10: member.has_i10,
                has_z71_3: member.has_z71_3,
                churn_prob_no_outreach: p_no,
                churn_prob_with_outreach: p_with,
                outreach_benefit,
                model_score,
                icd_boost,
                prioritization_score: model_score + icd_boost,
                rank: 0,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.prioritization_score
            .partial_cmp(&a.prioritization_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (position, result) in results.iter_mut().enumerate() {
        result.rank = position + 1;
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureColumn;

    /// Stub classifier: probability depends only on the outreach column,
    /// shifted per row so results are distinguishable.
    struct StubModel {
        outreach_index: usize,
        no_outreach_base: f64,
        outreach_drop: f64,
    }

    impl Classifier for StubModel {
        fn fit(&mut self, _x: &[Vec<f64>], _y: &[f64]) -> Result<(), PipelineError> {
            Ok(())
        }

        fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
            Ok(x.iter()
                .enumerate()
                .map(|(i, row)| {
                    let base = self.no_outreach_base - i as f64 * 0.1;
                    if row[self.outreach_index] > 0.5 {
                        base - self.outreach_drop
                    } else {
                        base
                    }
                })
                .collect())
        }
    }

    fn make_member(id: &str, flags: (u8, u8, u8)) -> MemberFeatures {
        MemberFeatures {
            member_id: id.to_string(),
            days_as_member: 100,
            outreach: 0,
            churn: None,
            session_count: 5,
            has_e11_9: flags.0,
            has_i10: flags.1,
            has_z71_3: flags.2,
            count_e11_9: flags.0 as u32,
            count_i10: flags.1 as u32,
            count_z71_3: flags.2 as u32,
            num_of_total_claims: (flags.0 + flags.1 + flags.2) as u32,
            total_web_visits: 0,
            health_web_visits: 0,
            non_health_web_visits: 0,
        }
    }

    fn stub() -> StubModel {
        let outreach_index = FeatureColumn::ALL
            .iter()
            .position(|c| *c == FeatureColumn::Outreach)
            .unwrap();
        StubModel {
            outreach_index,
            no_outreach_base: 0.8,
            outreach_drop: 0.2,
        }
    }

    #[test]
    fn test_composite_score_formula() {
        let schema = FeatureSchema::production();
        let members = vec![
            make_member("M1", (1, 1, 0)),
            make_member("M2", (0, 0, 0)),
            make_member("M3", (1, 1, 1)),
        ];

        let results = score_members(&stub(), &schema, &members).unwrap();

        for result in &results {
            let flags = (result.has_e11_9 + result.has_i10 + result.has_z71_3) as f64;
            assert!((result.icd_boost - 0.05 * flags).abs() < 1e-12);
            assert!(
                (result.outreach_benefit
                    - (result.churn_prob_no_outreach - result.churn_prob_with_outreach))
                    .abs()
                    < 1e-12
            );
            assert!(
                (result.model_score
                    - result.churn_prob_no_outreach * result.outreach_benefit)
                    .abs()
                    < 1e-12
            );
            assert!(
                (result.prioritization_score - (result.model_score + result.icd_boost)).abs()
                    < 1e-12
            );
        }
    }

    #[test]
    fn test_rank_is_dense_and_sorted() {
        let schema = FeatureSchema::production();
        let members: Vec<MemberFeatures> = (0..6)
            .map(|i| make_member(&format!("M{i}"), (0, 0, 0)))
            .collect();

        let results = score_members(&stub(), &schema, &members).unwrap();

        for (position, result) in results.iter().enumerate() {
            assert_eq!(result.rank, position + 1);
        }
        for pair in results.windows(2) {
            assert!(pair[0].prioritization_score >= pair[1].prioritization_score);
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        // Every member gets the same probabilities and no flags, so all
        // prioritization scores tie.
        struct Flat;
        impl Classifier for Flat {
            fn fit(&mut self, _x: &[Vec<f64>], _y: &[f64]) -> Result<(), PipelineError> {
                Ok(())
            }
            fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
                Ok(vec![0.6; x.len()])
            }
        }

        let schema = FeatureSchema::production();
        let members: Vec<MemberFeatures> = (0..5)
            .map(|i| make_member(&format!("M{i}"), (0, 0, 0)))
            .collect();

        let results = score_members(&Flat, &schema, &members).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.member_id.as_str()).collect();
        assert_eq!(ids, vec!["M0", "M1", "M2", "M3", "M4"]);
    }

    #[test]
    fn test_icd_boost_reorders_ranking() {
        // M2's probabilities are slightly lower, but three flags are worth
        // 0.15, which dominates the 0.01-scale probability gaps here.
        struct Narrow;
        impl Classifier for Narrow {
            fn fit(&mut self, _x: &[Vec<f64>], _y: &[f64]) -> Result<(), PipelineError> {
                Ok(())
            }
            fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
                Ok(x.iter()
                    .enumerate()
                    .map(|(i, row)| {
                        let base = if i % 2 == 0 { 0.50 } else { 0.48 };
                        if row[0] > 0.5 {
                            base - 0.05
                        } else {
                            base
                        }
                    })
                    .collect())
            }
        }

        let schema = FeatureSchema::production();
        let members = vec![make_member("M1", (0, 0, 0)), make_member("M2", (1, 1, 1))];

        let results = score_members(&Narrow, &schema, &members).unwrap();
        assert_eq!(results[0].member_id, "M2");
        assert_eq!(results[0].rank, 1);
    }
}
