//! Feature engineering
//!
//! This module joins and aggregates the raw member tables into one feature
//! row per member:
//! - Membership tenure from the signup date
//! - App-usage session counts
//! - Priority diagnosis flags and counts from claims
//! - Health vs non-health web-visit counts
//!
//! Every auxiliary join has left-join semantics with zero fill: a member
//! with no claims, sessions, or web visits gets zero-valued columns, never
//! a missing row.

use crate::config::{HEALTH_TITLES, MEMBERSHIP_REFERENCE_DATE, PRIORITY_ICD_CODES};
use crate::dataset::{ScoringTables, TrainingTables};
use crate::error::PipelineError;
use crate::types::{ClaimRecord, MemberFeatures, UsageEvent, WebVisit};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Feature builder for assembling per-member feature rows
pub struct FeatureBuilder;

impl FeatureBuilder {
    /// Build labeled feature rows for the training cohort, one per member
    /// in the label table.
    pub fn build_training(tables: &TrainingTables) -> Result<Vec<MemberFeatures>, PipelineError> {
        if tables.churn_labels.is_empty() {
            return Err(PipelineError::EmptyDataset(
                "churn_labels has no rows".to_string(),
            ));
        }

        let aggregates =
            CohortAggregates::collect(&tables.app_usage, &tables.claims, &tables.web_visits);

        tables
            .churn_labels
            .iter()
            .map(|label| {
                let days = days_as_member(&label.signup_date)?;
                Ok(aggregates.row(&label.member_id, days, label.outreach, Some(label.churn)))
            })
            .collect()
    }

    /// Build unlabeled feature rows for the scoring cohort, one per member
    /// in the member table. Outreach is set to 0 for every member since no
    /// outreach has happened for this cohort yet.
    pub fn build_scoring(tables: &ScoringTables) -> Result<Vec<MemberFeatures>, PipelineError> {
        if tables.members.is_empty() {
            return Err(PipelineError::EmptyDataset(
                "test_members has no rows".to_string(),
            ));
        }

        let aggregates =
            CohortAggregates::collect(&tables.app_usage, &tables.claims, &tables.web_visits);

        tables
            .members
            .iter()
            .map(|member| {
                let days = days_as_member(&member.signup_date)?;
                Ok(aggregates.row(&member.member_id, days, 0, None))
            })
            .collect()
    }
}

/// Days between the fixed reference date and a signup date.
///
/// Negative when the signup date falls after the reference date; passed
/// through unclamped.
pub fn days_as_member(signup_date: &str) -> Result<i64, PipelineError> {
    let date = NaiveDate::parse_from_str(signup_date, "%Y-%m-%d")
        .map_err(|e| PipelineError::DateParseError(format!("{signup_date}: {e}")))?;
    Ok((MEMBERSHIP_REFERENCE_DATE - date).num_days())
}

/// True when a page title counts as clinical health content.
pub fn is_health_title(title: &str) -> bool {
    HEALTH_TITLES.iter().any(|t| *t == title)
}

/// Per-member counts aggregated out of the auxiliary tables.
///
/// Lookups against a missing member return zero, which is what gives every
/// join its left-join-plus-fill semantics.
struct CohortAggregates {
    sessions: HashMap<String, u32>,
    code_counts: [HashMap<String, u32>; 3],
    total_claims: HashMap<String, u32>,
    total_visits: HashMap<String, u32>,
    health_visits: HashMap<String, u32>,
}

impl CohortAggregates {
    fn collect(usage: &[UsageEvent], claims: &[ClaimRecord], web_visits: &[WebVisit]) -> Self {
        let mut sessions: HashMap<String, u32> = HashMap::new();
        for event in usage {
            *sessions.entry(event.member_id.clone()).or_insert(0) += 1;
        }

        let mut code_counts: [HashMap<String, u32>; 3] = Default::default();
        let mut total_claims: HashMap<String, u32> = HashMap::new();
        for claim in claims {
            *total_claims.entry(claim.member_id.clone()).or_insert(0) += 1;
            if let Some(idx) = PRIORITY_ICD_CODES.iter().position(|code| *code == claim.icd_code) {
                *code_counts[idx].entry(claim.member_id.clone()).or_insert(0) += 1;
            }
        }

        let mut total_visits: HashMap<String, u32> = HashMap::new();
        let mut health_visits: HashMap<String, u32> = HashMap::new();
        for visit in web_visits {
            *total_visits.entry(visit.member_id.clone()).or_insert(0) += 1;
            if is_health_title(&visit.title) {
                *health_visits.entry(visit.member_id.clone()).or_insert(0) += 1;
            }
        }

        Self {
            sessions,
            code_counts,
            total_claims,
            total_visits,
            health_visits,
        }
    }

    /// Assemble the feature row for one member, zero-filling every
    /// aggregate the member has no records for.
    fn row(&self, member_id: &str, days_as_member: i64, outreach: u8, churn: Option<u8>) -> MemberFeatures {
        let count = |map: &HashMap<String, u32>| map.get(member_id).copied().unwrap_or(0);

        let counts = [
            count(&self.code_counts[0]),
            count(&self.code_counts[1]),
            count(&self.code_counts[2]),
        ];
        let total_web_visits = count(&self.total_visits);
        let health_web_visits = count(&self.health_visits);

        MemberFeatures {
            member_id: member_id.to_string(),
            days_as_member,
            outreach,
            churn,
            session_count: count(&self.sessions),
            has_e11_9: (counts[0] > 0) as u8,
            has_i10: (counts[1] > 0) as u8,
            has_z71_3: (counts[2] > 0) as u8,
            count_e11_9: counts[0],
            count_i10: counts[1],
            count_z71_3: counts[2],
            num_of_total_claims: count(&self.total_claims),
            total_web_visits,
            health_web_visits,
            // Health visits are a subset of total visits, so this never
            // underflows.
            non_health_web_visits: total_web_visits - health_web_visits,
        }
    }
}
