//! Outreach cohort sizing
//!
//! Determines how many top-ranked members to select for outreach, and
//! produces the smoothed benefit curve consumers plot to sanity-check the
//! cutoff.

use crate::config::{BENEFIT_SMOOTHING_WINDOW, CHURN_PROB_THRESHOLD};
use crate::types::ScoringResult;

/// Cohort size recommendation plus the diagnostic benefit curve.
#[derive(Debug, Clone)]
pub struct CohortSize {
    /// Members whose no-outreach churn probability exceeds the threshold.
    pub optimal_n: usize,
    /// Outreach benefits, clipped at zero and sorted descending.
    pub benefits: Vec<f64>,
    /// Trailing moving average of `benefits` over the smoothing window.
    /// Valid mode: length N - window + 1, empty when N < window.
    pub smoothed_benefits: Vec<f64>,
}

/// Size the outreach cohort from a scored member list.
pub fn find_optimal_n(results: &[ScoringResult]) -> CohortSize {
    let optimal_n = results
        .iter()
        .filter(|r| r.churn_prob_no_outreach > CHURN_PROB_THRESHOLD)
        .count();

    let mut benefits: Vec<f64> = results
        .iter()
        .map(|r| r.outreach_benefit.max(0.0))
        .collect();
    benefits.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let smoothed_benefits = moving_average(&benefits, BENEFIT_SMOOTHING_WINDOW);

    CohortSize {
        optimal_n,
        benefits,
        smoothed_benefits,
    }
}

/// Valid-mode trailing moving average: one output per full window, no
/// edge padding.
fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(values.len() - window + 1);
    let mut sum: f64 = values[..window].iter().sum();
    out.push(sum / window as f64);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out.push(sum / window as f64);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(id: usize, prob_no: f64, benefit: f64) -> ScoringResult {
        ScoringResult {
            member_id: format!("M{id}"),
            has_e11_9: 0,
            has_i10: 0,
            has_z71_3: 0,
            churn_prob_no_outreach: prob_no,
            churn_prob_with_outreach: prob_no - benefit,
            outreach_benefit: benefit,
            model_score: prob_no * benefit,
            icd_boost: 0.0,
            prioritization_score: prob_no * benefit,
            rank: id + 1,
        }
    }

    #[test]
    fn test_threshold_scenario() {
        // 1000 members, 220 of them above the 0.3 threshold
        let results: Vec<ScoringResult> = (0..1000)
            .map(|i| {
                let prob_no = if i < 220 { 0.55 } else { 0.25 };
                make_result(i, prob_no, 0.1)
            })
            .collect();

        let cohort = find_optimal_n(&results);
        assert_eq!(cohort.optimal_n, 220);
    }

    #[test]
    fn test_threshold_is_strict() {
        let results = vec![
            make_result(0, 0.3, 0.1),
            make_result(1, 0.300001, 0.1),
            make_result(2, 0.29, 0.1),
        ];

        let cohort = find_optimal_n(&results);
        assert_eq!(cohort.optimal_n, 1);
    }

    #[test]
    fn test_smoothed_length() {
        // 200 benefit values with a window of 50 leave 151 points
        let results: Vec<ScoringResult> = (0..200)
            .map(|i| make_result(i, 0.5, i as f64 / 200.0))
            .collect();

        let cohort = find_optimal_n(&results);
        assert_eq!(cohort.smoothed_benefits.len(), 151);
    }

    #[test]
    fn test_short_input_has_no_smoothed_curve() {
        let results: Vec<ScoringResult> =
            (0..10).map(|i| make_result(i, 0.5, 0.1)).collect();

        let cohort = find_optimal_n(&results);
        assert_eq!(cohort.benefits.len(), 10);
        assert!(cohort.smoothed_benefits.is_empty());
    }

    #[test]
    fn test_benefits_clipped_and_sorted() {
        let results = vec![
            make_result(0, 0.5, -0.2),
            make_result(1, 0.5, 0.3),
            make_result(2, 0.5, 0.1),
        ];

        let cohort = find_optimal_n(&results);
        assert_eq!(cohort.benefits, vec![0.3, 0.1, 0.0]);
    }

    #[test]
    fn test_moving_average_values() {
        let values = vec![4.0, 2.0, 6.0, 8.0];
        let smoothed = moving_average(&values, 2);
        assert_eq!(smoothed, vec![3.0, 4.0, 7.0]);
    }
}
