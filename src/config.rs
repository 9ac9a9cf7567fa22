//! Central pipeline configuration
//!
//! Single definitions for the clinical code set, the health-content title
//! set, the membership reference date, thresholds, and seeds. Every
//! consumer pulls from here so the sets cannot drift apart between the
//! feature builder, the scorer, and the cohort sizer.

use chrono::NaiveDate;

/// Priority ICD-10 codes tracked as individual feature flags:
/// E11.9 (type 2 diabetes), I10 (essential hypertension),
/// Z71.3 (dietary counseling).
pub const PRIORITY_ICD_CODES: [&str; 3] = ["E11.9", "I10", "Z71.3"];

/// Curated clinical-content titles. A web visit counts as a health visit
/// when its title is in this set; everything else is non-health.
pub const HEALTH_TITLES: [&str; 18] = [
    "Diabetes management",
    "Hypertension basics",
    "Stress reduction",
    "Restorative sleep tips",
    "Healthy eating guide",
    "Aerobic exercise",
    "HbA1c targets",
    "Strength training basics",
    "Lowering blood pressure",
    "Sleep hygiene",
    "Cardio workouts",
    "Mediterranean diet",
    "Exercise routines",
    "Meditation guide",
    "Cardiometabolic health",
    "High-fiber meals",
    "Cholesterol friendly foods",
    "Weight management",
];

/// Membership tenure is measured against this fixed reference date.
/// Signups after it produce a negative tenure, which passes through
/// unclamped.
pub const MEMBERSHIP_REFERENCE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 7, 1) {
    Some(date) => date,
    None => panic!("invalid membership reference date"),
};

/// Members whose no-outreach churn probability exceeds this threshold are
/// selected for outreach. Tuned against the ~20% churn rate observed in
/// the historical training cohort; a fixed constant, not derived at
/// runtime.
pub const CHURN_PROB_THRESHOLD: f64 = 0.3;

/// Prioritization boost per priority-code flag a member carries. Paired
/// with [`CHURN_PROB_THRESHOLD`]; tunable alongside it.
pub const ICD_BOOST_WEIGHT: f64 = 0.05;

/// Window for the trailing moving average over the sorted benefit curve.
pub const BENEFIT_SMOOTHING_WINDOW: usize = 50;

/// Number of cross-validation folds used during model evaluation.
pub const CV_FOLDS: usize = 5;

/// Seed for cross-validation fold shuffling.
pub const CV_SHUFFLE_SEED: u64 = 42;

/// Seed for the bagged forest's bootstrap sampling.
pub const FOREST_SEED: u64 = 124;

/// Seed for the boosted ensemble's row subsampling.
pub const BOOSTING_SEED: u64 = 42;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_titles_are_distinct() {
        let mut titles = HEALTH_TITLES.to_vec();
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(titles.len(), HEALTH_TITLES.len());
    }

    #[test]
    fn test_reference_date() {
        assert_eq!(
            MEMBERSHIP_REFERENCE_DATE,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        );
    }
}
