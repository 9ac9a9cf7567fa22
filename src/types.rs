//! Core types for the triage pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw table records, per-member feature rows, the typed feature
//! schema shared by training and scoring, and scoring results.

use serde::{Deserialize, Serialize};

/// App-usage event. Only its existence matters: events are counted per
/// member into `session_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    pub member_id: String,
}

/// Labeled training-cohort row: signup date plus historical churn and
/// outreach indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnLabel {
    pub member_id: String,
    /// Signup date as YYYY-MM-DD
    pub signup_date: String,
    /// 0/1 churn label
    pub churn: u8,
    /// 0/1 historical intervention indicator
    pub outreach: u8,
}

/// Unlabeled scoring-cohort row. No outreach has happened for these
/// members yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub member_id: String,
    /// Signup date as YYYY-MM-DD
    pub signup_date: String,
}

/// Claim record carrying a diagnosis code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub member_id: String,
    pub icd_code: String,
}

/// Web-visit event carrying a page/content topic title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebVisit {
    pub member_id: String,
    pub title: String,
}

/// One engineered feature row per member - the unit consumed by the model.
///
/// Every numeric field is always present: members absent from an auxiliary
/// table get zeroes, never a missing value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberFeatures {
    pub member_id: String,
    /// Days between the fixed reference date and the signup date. Negative
    /// when the signup date falls after the reference date.
    pub days_as_member: i64,
    /// 0/1 historical intervention indicator; 0 for the scoring cohort.
    pub outreach: u8,
    /// 0/1 churn label; present for the training cohort only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub churn: Option<u8>,
    /// App sessions recorded for this member.
    pub session_count: u32,
    #[serde(rename = "has_E11_9")]
    pub has_e11_9: u8,
    #[serde(rename = "has_I10")]
    pub has_i10: u8,
    #[serde(rename = "has_Z71_3")]
    pub has_z71_3: u8,
    #[serde(rename = "count_E11_9")]
    pub count_e11_9: u32,
    #[serde(rename = "count_I10")]
    pub count_i10: u32,
    #[serde(rename = "count_Z71_3")]
    pub count_z71_3: u32,
    pub num_of_total_claims: u32,
    pub total_web_visits: u32,
    pub health_web_visits: u32,
    pub non_health_web_visits: u32,
}

impl MemberFeatures {
    /// Numeric value of one model input column.
    pub fn value(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::Outreach => self.outreach as f64,
            FeatureColumn::DaysAsMember => self.days_as_member as f64,
            FeatureColumn::SessionCount => self.session_count as f64,
            FeatureColumn::HasE119 => self.has_e11_9 as f64,
            FeatureColumn::HasI10 => self.has_i10 as f64,
            FeatureColumn::HasZ713 => self.has_z71_3 as f64,
            FeatureColumn::CountE119 => self.count_e11_9 as f64,
            FeatureColumn::CountI10 => self.count_i10 as f64,
            FeatureColumn::CountZ713 => self.count_z71_3 as f64,
            FeatureColumn::NumOfTotalClaims => self.num_of_total_claims as f64,
            FeatureColumn::TotalWebVisits => self.total_web_visits as f64,
            FeatureColumn::HealthWebVisits => self.health_web_visits as f64,
            FeatureColumn::NonHealthWebVisits => self.non_health_web_visits as f64,
        }
    }

    /// Number of priority-code flags set for this member (0-3).
    pub fn priority_flag_count(&self) -> u32 {
        (self.has_e11_9 + self.has_i10 + self.has_z71_3) as u32
    }
}

/// Model input columns, in training order.
///
/// `member_id` and `churn` are deliberately absent: the identifier is not a
/// predictor and the label is the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureColumn {
    Outreach,
    DaysAsMember,
    SessionCount,
    HasE119,
    HasI10,
    HasZ713,
    CountE119,
    CountI10,
    CountZ713,
    NumOfTotalClaims,
    TotalWebVisits,
    HealthWebVisits,
    NonHealthWebVisits,
}

impl FeatureColumn {
    /// All model input columns in canonical training order.
    pub const ALL: [FeatureColumn; 13] = [
        FeatureColumn::Outreach,
        FeatureColumn::DaysAsMember,
        FeatureColumn::SessionCount,
        FeatureColumn::HasE119,
        FeatureColumn::HasI10,
        FeatureColumn::HasZ713,
        FeatureColumn::CountE119,
        FeatureColumn::CountI10,
        FeatureColumn::CountZ713,
        FeatureColumn::NumOfTotalClaims,
        FeatureColumn::TotalWebVisits,
        FeatureColumn::HealthWebVisits,
        FeatureColumn::NonHealthWebVisits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureColumn::Outreach => "outreach",
            FeatureColumn::DaysAsMember => "days_as_member",
            FeatureColumn::SessionCount => "session_count",
            FeatureColumn::HasE119 => "has_E11_9",
            FeatureColumn::HasI10 => "has_I10",
            FeatureColumn::HasZ713 => "has_Z71_3",
            FeatureColumn::CountE119 => "count_E11_9",
            FeatureColumn::CountI10 => "count_I10",
            FeatureColumn::CountZ713 => "count_Z71_3",
            FeatureColumn::NumOfTotalClaims => "num_of_total_claims",
            FeatureColumn::TotalWebVisits => "total_web_visits",
            FeatureColumn::HealthWebVisits => "health_web_visits",
            FeatureColumn::NonHealthWebVisits => "non_health_web_visits",
        }
    }
}

/// Ordered set of model input columns.
///
/// Fixed at training time and reused at scoring time so both cohorts
/// produce design matrices with identical column set and order. The scorer
/// goes through this schema rather than selecting columns by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<FeatureColumn>,
}

impl FeatureSchema {
    /// The full production schema, in canonical training order.
    pub fn production() -> Self {
        Self {
            columns: FeatureColumn::ALL.to_vec(),
        }
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    /// Column names in schema order.
    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// One design-matrix row for a member.
    pub fn row(&self, features: &MemberFeatures) -> Vec<f64> {
        self.columns.iter().map(|&c| features.value(c)).collect()
    }

    /// One design-matrix row with the outreach column forced to `outreach`.
    pub fn row_with_outreach(&self, features: &MemberFeatures, outreach: f64) -> Vec<f64> {
        self.columns
            .iter()
            .map(|&c| match c {
                FeatureColumn::Outreach => outreach,
                _ => features.value(c),
            })
            .collect()
    }

    /// Design matrix over a cohort, one row per member.
    pub fn matrix(&self, features: &[MemberFeatures]) -> Vec<Vec<f64>> {
        features.iter().map(|f| self.row(f)).collect()
    }

    /// Design matrix with the outreach column forced to `outreach` for
    /// every member. Used for counterfactual scoring.
    pub fn matrix_with_outreach(&self, features: &[MemberFeatures], outreach: f64) -> Vec<Vec<f64>> {
        features
            .iter()
            .map(|f| self.row_with_outreach(f, outreach))
            .collect()
    }
}

/// Per-member scoring result: counterfactual churn probabilities and the
/// derived prioritization scores. Fully derived, computed once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResult {
    pub member_id: String,
    #[serde(rename = "has_E11_9")]
    pub has_e11_9: u8,
    #[serde(rename = "has_I10")]
    pub has_i10: u8,
    #[serde(rename = "has_Z71_3")]
    pub has_z71_3: u8,
    /// Churn probability with outreach forced off.
    pub churn_prob_no_outreach: f64,
    /// Churn probability with outreach forced on.
    pub churn_prob_with_outreach: f64,
    /// `churn_prob_no_outreach - churn_prob_with_outreach`
    pub outreach_benefit: f64,
    /// `churn_prob_no_outreach * outreach_benefit`
    pub model_score: f64,
    /// Boost from priority-code flags.
    pub icd_boost: f64,
    /// `model_score + icd_boost`; the ranking key.
    pub prioritization_score: f64,
    /// 1-based position after sorting by prioritization score descending.
    pub rank: usize,
}
