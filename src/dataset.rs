//! Tabular data access
//!
//! Loads the four training and four scoring tables from CSV. Each header
//! is validated against the expected column set before any row is
//! deserialized, so a malformed export fails fast with a schema error
//! instead of propagating missing values downstream.

use crate::error::PipelineError;
use crate::types::{ChurnLabel, ClaimRecord, MemberRecord, UsageEvent, WebVisit};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Raw tables for the labeled training cohort.
#[derive(Debug, Clone)]
pub struct TrainingTables {
    pub app_usage: Vec<UsageEvent>,
    pub churn_labels: Vec<ChurnLabel>,
    pub claims: Vec<ClaimRecord>,
    pub web_visits: Vec<WebVisit>,
}

impl TrainingTables {
    /// Load `app_usage.csv`, `churn_labels.csv`, `claims.csv`, and
    /// `web_visits.csv` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self, PipelineError> {
        Ok(Self {
            app_usage: load_table(&dir.join("app_usage.csv"), "app_usage", &["member_id"])?,
            churn_labels: load_table(
                &dir.join("churn_labels.csv"),
                "churn_labels",
                &["member_id", "signup_date", "churn", "outreach"],
            )?,
            claims: load_table(&dir.join("claims.csv"), "claims", &["member_id", "icd_code"])?,
            web_visits: load_table(
                &dir.join("web_visits.csv"),
                "web_visits",
                &["member_id", "title"],
            )?,
        })
    }
}

/// Raw tables for the unlabeled scoring cohort.
#[derive(Debug, Clone)]
pub struct ScoringTables {
    pub app_usage: Vec<UsageEvent>,
    pub members: Vec<MemberRecord>,
    pub claims: Vec<ClaimRecord>,
    pub web_visits: Vec<WebVisit>,
}

impl ScoringTables {
    /// Load `test_app_usage.csv`, `test_members.csv`, `test_claims.csv`,
    /// and `test_web_visits.csv` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self, PipelineError> {
        Ok(Self {
            app_usage: load_table(
                &dir.join("test_app_usage.csv"),
                "test_app_usage",
                &["member_id"],
            )?,
            members: load_table(
                &dir.join("test_members.csv"),
                "test_members",
                &["member_id", "signup_date"],
            )?,
            claims: load_table(
                &dir.join("test_claims.csv"),
                "test_claims",
                &["member_id", "icd_code"],
            )?,
            web_visits: load_table(
                &dir.join("test_web_visits.csv"),
                "test_web_visits",
                &["member_id", "title"],
            )?,
        })
    }
}

/// Load one CSV table from disk.
pub fn load_table<T: DeserializeOwned>(
    path: &Path,
    table: &str,
    required: &[&str],
) -> Result<Vec<T>, PipelineError> {
    let file = File::open(path)?;
    read_table(file, table, required)
}

/// Read a CSV table from any reader, validating the header first.
///
/// Required columns may appear in any order; extra columns are ignored.
pub fn read_table<R: Read, T: DeserializeOwned>(
    reader: R,
    table: &str,
    required: &[&str],
) -> Result<Vec<T>, PipelineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(PipelineError::SchemaError {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}
