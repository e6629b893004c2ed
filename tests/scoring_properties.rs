//! Properties of the scoring model, strictness policy and revision decision.

use proptest::prelude::*;
use reportloop::domain::models::{Issue, IssueType, Severity, Strictness};
use reportloop::services::revision_decision::{convergence_threshold, decide};
use reportloop::services::scoring::{reconcile, severity_weighted_score, MAX_SCORE, MIN_SCORE};
use reportloop::services::strictness::filter_issues;
use test_strategy::Arbitrary;

/// Generated stand-in for an oracle issue.
#[derive(Debug, Clone, Arbitrary)]
struct IssueSpec {
    #[strategy(0usize..9)]
    type_index: usize,
    #[strategy(0usize..3)]
    severity_index: usize,
}

const TYPES: [IssueType; 9] = [
    IssueType::MissingSection,
    IssueType::FactualError,
    IssueType::SectionOrder,
    IssueType::RequiredElementMissing,
    IssueType::RecommendationIssue,
    IssueType::ClarityIssue,
    IssueType::Relevance,
    IssueType::FormatIssue,
    IssueType::General,
];

const SEVERITIES: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

impl IssueSpec {
    fn build(&self, n: usize) -> Issue {
        Issue::new(
            TYPES[self.type_index].clone(),
            "Data Requirement Assessment",
            format!("issue {n}"),
        )
        .with_severity(SEVERITIES[self.severity_index])
    }
}

fn build_all(specs: &[IssueSpec]) -> Vec<Issue> {
    specs.iter().enumerate().map(|(n, s)| s.build(n)).collect()
}

#[test_strategy::proptest]
fn prop_computed_score_stays_in_bounds(#[strategy(proptest::collection::vec(any::<IssueSpec>(), 0..30))] specs: Vec<IssueSpec>) {
    let score = severity_weighted_score(&build_all(&specs));
    prop_assert!((MIN_SCORE..=MAX_SCORE).contains(&score));
}

proptest! {
    /// Raising any single issue's severity never raises the score.
    #[test]
    fn prop_score_monotone_in_severity(
        specs in proptest::collection::vec(any::<IssueSpec>(), 1..12),
        pick in any::<prop::sample::Index>(),
    ) {
        let issues = build_all(&specs);
        let i = pick.index(issues.len());
        let mut raised = issues.clone();
        raised[i].severity = Severity::High;

        prop_assert!(severity_weighted_score(&raised) <= severity_weighted_score(&issues));
    }

    /// Adding an issue never raises the score.
    #[test]
    fn prop_more_issues_never_score_higher(
        specs in proptest::collection::vec(any::<IssueSpec>(), 0..12),
        extra in any::<IssueSpec>(),
    ) {
        let issues = build_all(&specs);
        let mut more = issues.clone();
        more.push(extra.build(99));

        prop_assert!(severity_weighted_score(&more) <= severity_weighted_score(&issues));
    }

    /// Each later strictness level keeps a subset of the earlier one, and
    /// critical types survive every level.
    #[test]
    fn prop_strictness_only_narrows(specs in proptest::collection::vec(any::<IssueSpec>(), 0..20)) {
        let issues = build_all(&specs);
        let strict = filter_issues(issues.clone(), Strictness::Strict);
        let moderate = filter_issues(issues.clone(), Strictness::Moderate);
        let lenient = filter_issues(issues.clone(), Strictness::Lenient);

        prop_assert_eq!(strict.len(), issues.len());
        prop_assert!(moderate.iter().all(|i| strict.contains(i)));
        prop_assert!(lenient.iter().all(|i| moderate.contains(i)));

        let critical = issues.iter().filter(|i| i.issue_type.is_critical()).count();
        prop_assert_eq!(
            lenient.iter().filter(|i| i.issue_type.is_critical()).count(),
            critical
        );
    }

    /// The reconciled score is bounded and has one decimal.
    #[test]
    fn prop_reconciled_score_is_bounded(
        oracle in proptest::option::of(-5.0f64..20.0),
        specs in proptest::collection::vec(any::<IssueSpec>(), 0..15),
        round in 1u32..=5,
    ) {
        let score = reconcile(oracle, &build_all(&specs), round, &[]);
        prop_assert!((MIN_SCORE..=MAX_SCORE).contains(&score));
        prop_assert!(((score * 10.0).round() - score * 10.0).abs() < 1e-9);
    }

    /// The convergence threshold relaxes with rounds but never below 6.
    #[test]
    fn prop_convergence_threshold_non_increasing(round in 3u32..50) {
        let here = convergence_threshold(round);
        prop_assert!(convergence_threshold(round + 1) <= here);
        prop_assert!(here >= 6.0);
    }
}

#[test]
fn test_single_high_factual_error_scores_six_and_a_half() {
    let issues = vec![Issue::new(IssueType::FactualError, "AI Maturity Level", "wrong")
        .with_severity(Severity::High)];
    assert!((severity_weighted_score(&issues) - 6.5).abs() < 1e-9);
}

#[test]
fn test_round_one_clean_report_at_8_6_is_accepted() {
    assert!(!decide(8.6, &[], 1).needs_revision);
}

#[test]
fn test_round_one_three_minor_issues_force_revision() {
    let issues: Vec<Issue> = (0..3)
        .map(|n| {
            Issue::new(IssueType::ClarityIssue, "Recommendations", format!("wordy {n}"))
                .with_severity(Severity::Low)
        })
        .collect();
    let decision = decide(9.0, &issues, 1);
    assert!(decision.needs_revision);
    assert!(decision.explanation.contains("3 minor issues"));
}

#[test]
fn test_round_four_threshold_arithmetic() {
    assert!((convergence_threshold(4) - 6.8).abs() < 1e-9);

    let issues = vec![Issue::new(IssueType::ClarityIssue, "Recommendations", "wordy")
        .with_severity(Severity::Medium)];
    let live = filter_issues(issues, Strictness::for_round(4));
    assert!(live.is_empty());

    let decision = decide(6.2, &live, 4);
    assert!(decision.needs_revision);
    assert!(decision.explanation.contains("6.2 < 6.8"));
}

#[test]
fn test_missing_mandatory_section_always_revises() {
    let issues = vec![Issue::new(IssueType::MissingSection, "Recommendations", "absent")];
    for round in 1..=5 {
        assert!(decide(9.8, &issues, round).needs_revision, "round {round}");
    }
}
