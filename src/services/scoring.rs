//! Severity-weighted scoring and reconciliation with the oracle's own score.
//!
//! The computed score is the objective baseline; the oracle's score only
//! moves it, and only by a bounded amount.

use std::collections::HashSet;

use crate::domain::models::Issue;

pub const MAX_SCORE: f64 = 10.0;
pub const MIN_SCORE: f64 = 1.0;

/// Oracle scores further than this from the computed score are distrusted.
const DIVERGENCE_LIMIT: f64 = 1.5;
const MAX_IMPROVEMENT_BONUS: f64 = 0.5;

/// `10 - Σ weight(severity) × multiplier(type)`, floored at 1.
pub fn severity_weighted_score(issues: &[Issue]) -> f64 {
    let deduction: f64 = issues
        .iter()
        .map(|issue| issue.severity.weight() * issue.issue_type.multiplier())
        .sum();
    (MAX_SCORE - deduction).max(MIN_SCORE)
}

/// Bonus for net issue resolution since the previous round, compared by
/// description. Zero when nothing was resolved or more was introduced.
pub fn improvement_bonus(current: &[Issue], previous: &[Issue]) -> f64 {
    if previous.is_empty() {
        return 0.0;
    }

    let current_desc: HashSet<&str> = current.iter().map(|i| i.description.as_str()).collect();
    let previous_desc: HashSet<&str> = previous.iter().map(|i| i.description.as_str()).collect();

    let resolved = previous_desc.difference(&current_desc).count();
    let introduced = current_desc.difference(&previous_desc).count();
    tracing::debug!(
        resolved,
        persistent = previous_desc.intersection(&current_desc).count(),
        introduced,
        "issue progression"
    );

    if resolved > 0 && introduced <= resolved {
        let ratio = (resolved - introduced) as f64 / previous.len() as f64;
        (ratio * MAX_IMPROVEMENT_BONUS).min(MAX_IMPROVEMENT_BONUS)
    } else {
        0.0
    }
}

/// Combine the oracle's score with the computed one.
///
/// `oracle_score` is `None` when the oracle gave nothing usable, in which
/// case the computed score stands. The result is always rounded to one decimal.
pub fn reconcile(
    oracle_score: Option<f64>,
    issues: &[Issue],
    round: u32,
    previous_issues: &[Issue],
) -> f64 {
    let computed = severity_weighted_score(issues);

    let Some(raw) = oracle_score.filter(|s| s.is_finite()) else {
        tracing::debug!(computed, "no usable oracle score, using computed score");
        return round_one_decimal(computed);
    };
    let oracle = raw.clamp(MIN_SCORE, MAX_SCORE);

    let mut score = if (oracle - computed).abs() > DIVERGENCE_LIMIT {
        tracing::debug!(oracle, computed, "oracle score diverges, weighting computed score");
        0.7 * computed + 0.3 * oracle
    } else {
        (oracle + computed) / 2.0
    };

    if round > 1 && !previous_issues.is_empty() {
        let bonus = improvement_bonus(issues, previous_issues);
        if bonus > 0.0 {
            score = (score + bonus).min(MAX_SCORE);
        }
    }

    round_one_decimal(score)
}

/// Score synthesised from an issue count alone.
pub fn fallback_score(issue_count: usize) -> f64 {
    let penalty = (0.25 * issue_count as f64).min(2.5);
    (7.5 - penalty).max(MIN_SCORE)
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{IssueType, Severity};

    fn issue(issue_type: IssueType, severity: Severity, description: &str) -> Issue {
        Issue::new(issue_type, "Recommendations", description).with_severity(severity)
    }

    #[test]
    fn test_no_issues_scores_ten() {
        assert!((severity_weighted_score(&[]) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_high_factual_error() {
        let issues = vec![issue(IssueType::FactualError, Severity::High, "wrong year")];
        assert!((severity_weighted_score(&issues) - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_score_floors_at_one() {
        let issues: Vec<_> = (0..10)
            .map(|i| issue(IssueType::FactualError, Severity::High, &format!("e{i}")))
            .collect();
        assert!((severity_weighted_score(&issues) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reconcile_invalid_oracle_score_uses_computed() {
        let issues = vec![issue(IssueType::ClarityIssue, Severity::Low, "wordy")];
        // 10 - 0.4 * 0.7 = 9.72
        assert!((reconcile(None, &issues, 1, &[]) - 9.7).abs() < 1e-9);
        assert!((reconcile(Some(f64::NAN), &issues, 1, &[]) - 9.7).abs() < 1e-9);
    }

    #[test]
    fn test_reconcile_close_scores_average() {
        let issues = vec![issue(IssueType::FactualError, Severity::High, "x")];
        // computed 6.5, oracle 7.0 -> 6.75 -> 6.8
        assert!((reconcile(Some(7.0), &issues, 1, &[]) - 6.8).abs() < 1e-9);
    }

    #[test]
    fn test_reconcile_divergent_scores_weighted() {
        let issues = vec![issue(IssueType::FactualError, Severity::High, "x")];
        // computed 6.5, oracle 9.5 -> 0.7*6.5 + 0.3*9.5 = 7.4
        assert!((reconcile(Some(9.5), &issues, 1, &[]) - 7.4).abs() < 1e-9);
    }

    #[test]
    fn test_reconcile_clamps_oracle() {
        // computed 10, oracle 42 -> clamped 10 -> 10
        assert!((reconcile(Some(42.0), &[], 1, &[]) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_improvement_bonus() {
        let previous = vec![
            issue(IssueType::ClarityIssue, Severity::Low, "a"),
            issue(IssueType::ClarityIssue, Severity::Low, "b"),
        ];
        let current = vec![issue(IssueType::ClarityIssue, Severity::Low, "b")];
        // one resolved, none new: 1/2 * 0.5 = 0.25
        assert!((improvement_bonus(&current, &previous) - 0.25).abs() < 1e-9);

        let worse = vec![
            issue(IssueType::ClarityIssue, Severity::Low, "c"),
            issue(IssueType::ClarityIssue, Severity::Low, "d"),
            issue(IssueType::ClarityIssue, Severity::Low, "e"),
        ];
        assert!(improvement_bonus(&worse, &previous).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bonus_only_after_round_one() {
        let previous = vec![issue(IssueType::ClarityIssue, Severity::Low, "a")];
        // computed 10, oracle 10 -> 10 either way; use a lower oracle score
        let round1 = reconcile(Some(9.0), &[], 1, &previous);
        let round2 = reconcile(Some(9.0), &[], 2, &previous);
        assert!((round1 - 9.5).abs() < 1e-9);
        assert!((round2 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_score() {
        assert!((fallback_score(0) - 7.5).abs() < f64::EPSILON);
        assert!((fallback_score(4) - 6.5).abs() < f64::EPSILON);
        assert!((fallback_score(40) - 5.0).abs() < f64::EPSILON);
    }
}
