//! Round-aware revise/stop decision.
//!
//! Thresholds relax as rounds progress so the loop converges: round 1
//! demands a polished report, round 2 ignores minor issues and round 3 onward
//! only stops for critical findings or a score under the convergence
//! threshold.

use crate::domain::models::sections::MANDATORY_SECTIONS;
use crate::domain::models::{Issue, IssueType, Severity};

const ROUND_ONE_THRESHOLD: f64 = 8.5;
const ROUND_TWO_THRESHOLD: f64 = 8.0;
const MAX_MINOR_IN_ROUND_ONE: usize = 2;

/// Whether another revision is needed, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionDecision {
    pub needs_revision: bool,
    pub explanation: String,
}

impl RevisionDecision {
    fn revise(explanation: String) -> Self {
        Self {
            needs_revision: true,
            explanation,
        }
    }

    fn accept(explanation: String) -> Self {
        Self {
            needs_revision: false,
            explanation,
        }
    }
}

/// Score threshold for convergence-mode rounds (3 and later).
pub fn convergence_threshold(round: u32) -> f64 {
    let steps = f64::from(round.saturating_sub(3));
    (7.0 - 0.2 * steps).max(6.0)
}

pub fn standard_level(score: f64) -> &'static str {
    if score >= 9.0 {
        "high standards"
    } else if score >= 8.0 {
        "moderate standards"
    } else if score >= 7.0 {
        "acceptable standards"
    } else {
        "below minimum standards"
    }
}

/// Missing Section issues that name one of the mandatory sections.
pub fn missing_mandatory_issues(issues: &[Issue]) -> Vec<&Issue> {
    issues
        .iter()
        .filter(|i| i.issue_type == IssueType::MissingSection)
        .filter(|i| MANDATORY_SECTIONS.iter().any(|name| i.section.contains(name)))
        .collect()
}

struct IssueClasses {
    high: usize,
    critical: usize,
    serious: usize,
    minor: usize,
    critical_high: usize,
}

impl IssueClasses {
    fn of(issues: &[Issue]) -> Self {
        let count = |pred: &dyn Fn(&Issue) -> bool| issues.iter().filter(|i| pred(i)).count();
        Self {
            high: count(&|i| i.severity == Severity::High),
            critical: count(&|i| i.issue_type.is_critical()),
            serious: count(&|i| i.issue_type.is_serious()),
            minor: count(&|i| i.issue_type.is_minor()),
            critical_high: count(&|i| i.severity == Severity::High && i.issue_type.is_critical()),
        }
    }
}

/// Decide whether the artifact needs another revision.
///
/// `issues` must already be filtered by the round's strictness level and
/// `score` must be the reconciled score.
pub fn decide(score: f64, issues: &[Issue], round: u32) -> RevisionDecision {
    let missing = missing_mandatory_issues(issues);
    if !missing.is_empty() {
        let listed = missing
            .iter()
            .take(3)
            .map(|i| format!("'{}'", i.section))
            .collect::<Vec<_>>()
            .join(", ");
        let more = if missing.len() > 3 { "..." } else { "" };
        return RevisionDecision::revise(format!(
            "Report requires revision due to {} missing critical sections: [{listed}]{more}",
            missing.len()
        ));
    }

    let classes = IssueClasses::of(issues);
    let decision = match round {
        0 | 1 => decide_first_round(score, &classes),
        2 => decide_second_round(score, &classes),
        _ => decide_convergence_round(score, issues.len(), &classes, round),
    };

    tracing::debug!(
        round,
        score,
        high = classes.high,
        critical = classes.critical,
        serious = classes.serious,
        minor = classes.minor,
        needs_revision = decision.needs_revision,
        "revision decision"
    );
    decision
}

fn severity_triggers(classes: &IssueClasses) -> Vec<String> {
    let mut triggers = Vec::new();
    if classes.high > 0 {
        triggers.push(format!("{} high-severity issues", classes.high));
    }
    if classes.critical > 0 {
        triggers.push(format!("{} critical-type issues", classes.critical));
    }
    if classes.serious > 0 {
        triggers.push(format!("{} serious-type issues", classes.serious));
    }
    triggers
}

fn decide_first_round(score: f64, classes: &IssueClasses) -> RevisionDecision {
    let mut triggers = Vec::new();
    if score < ROUND_ONE_THRESHOLD {
        triggers.push(format!("score below 8.5 ({score:.1})"));
    }
    triggers.extend(severity_triggers(classes));
    if classes.minor > MAX_MINOR_IN_ROUND_ONE {
        triggers.push(format!(
            "{} minor issues (max 2 allowed in round 1)",
            classes.minor
        ));
    }

    if triggers.is_empty() {
        RevisionDecision::accept(format!(
            "Round 1 quality approved (meets {}): Score {score:.1}/10, {} minor issues (≤2 allowed)",
            standard_level(score),
            classes.minor
        ))
    } else {
        RevisionDecision::revise(format!("Round 1 revision needed: {}", triggers.join(", ")))
    }
}

fn decide_second_round(score: f64, classes: &IssueClasses) -> RevisionDecision {
    let mut triggers = Vec::new();
    if score < ROUND_TWO_THRESHOLD {
        triggers.push(format!("score below 8.0 ({score:.1})"));
    }
    triggers.extend(severity_triggers(classes));

    if triggers.is_empty() {
        RevisionDecision::accept(format!(
            "Round 2 quality approved (meets {}): Score {score:.1}/10, only {} minor issues remain",
            standard_level(score),
            classes.minor
        ))
    } else {
        RevisionDecision::revise(format!(
            "Round 2 revision needed: {} (ignoring {} minor issues)",
            triggers.join(", "),
            classes.minor
        ))
    }
}

fn decide_convergence_round(
    score: f64,
    issue_count: usize,
    classes: &IssueClasses,
    round: u32,
) -> RevisionDecision {
    let threshold = convergence_threshold(round);
    let mut triggers = Vec::new();
    if score < threshold {
        triggers.push(format!(
            "score below convergence threshold ({score:.1} < {threshold:.1})"
        ));
    }
    if classes.critical_high > 0 {
        triggers.push(format!("{} critical high-severity issues", classes.critical_high));
    }
    if classes.critical > 0 {
        triggers.push(format!("{} structural/factual errors", classes.critical));
    }

    if !triggers.is_empty() {
        let ignored = issue_count.saturating_sub(classes.critical_high + classes.critical);
        return RevisionDecision::revise(format!(
            "Round {round} revision needed: {} (CONVERGENCE MODE: ignoring {ignored} non-critical issues)",
            triggers.join(", ")
        ));
    }

    if issue_count == 0 {
        RevisionDecision::accept(format!("Round {round} No issues found, score {score:.1}/10"))
    } else {
        RevisionDecision::accept(format!(
            "Round {round} CONVERGENCE ACHIEVED: Score {score:.1}/10 ≥ {threshold:.1}. \
             Remaining {issue_count} issues ({} serious, {} minor) do not justify further revision. \
             Quality threshold met for completion.",
            classes.serious, classes.minor
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clarity(n: usize) -> Vec<Issue> {
        (0..n)
            .map(|i| Issue::new(IssueType::ClarityIssue, "Recommendations", format!("c{i}")))
            .collect()
    }

    #[test]
    fn test_round_one_clean_report_is_accepted() {
        let decision = decide(8.6, &[], 1);
        assert!(!decision.needs_revision);
        assert_eq!(
            decision.explanation,
            "Round 1 quality approved (meets moderate standards): Score 8.6/10, 0 minor issues (≤2 allowed)"
        );
    }

    #[test]
    fn test_round_one_three_minor_issues_revise() {
        let decision = decide(9.0, &clarity(3), 1);
        assert!(decision.needs_revision);
        assert_eq!(
            decision.explanation,
            "Round 1 revision needed: 3 minor issues (max 2 allowed in round 1)"
        );
    }

    #[test]
    fn test_round_one_names_every_trigger() {
        let issues = vec![Issue::new(IssueType::FactualError, "AI Maturity Level", "wrong")];
        let decision = decide(6.5, &issues, 1);
        assert_eq!(
            decision.explanation,
            "Round 1 revision needed: score below 8.5 (6.5), 1 high-severity issues, 1 critical-type issues"
        );
    }

    #[test]
    fn test_round_two_ignores_minor() {
        let decision = decide(8.2, &clarity(4), 2);
        assert!(!decision.needs_revision);
        assert!(decision.explanation.contains("only 4 minor issues remain"));

        let decision = decide(7.9, &clarity(1), 2);
        assert!(decision.needs_revision);
        assert_eq!(
            decision.explanation,
            "Round 2 revision needed: score below 8.0 (7.9) (ignoring 1 minor issues)"
        );
    }

    #[test]
    fn test_convergence_thresholds() {
        assert!((convergence_threshold(3) - 7.0).abs() < 1e-9);
        assert!((convergence_threshold(4) - 6.8).abs() < 1e-9);
        assert!((convergence_threshold(5) - 6.6).abs() < 1e-9);
        assert!((convergence_threshold(20) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_four_low_score_without_issues_revises() {
        let decision = decide(6.2, &[], 4);
        assert!(decision.needs_revision);
        assert_eq!(
            decision.explanation,
            "Round 4 revision needed: score below convergence threshold (6.2 < 6.8) (CONVERGENCE MODE: ignoring 0 non-critical issues)"
        );
    }

    #[test]
    fn test_convergence_achieved_with_remaining_issues() {
        let mut issues = clarity(1);
        issues.push(
            Issue::new(IssueType::RequiredElementMissing, "Data Collection Strategy", "x")
                .with_severity(Severity::High),
        );
        let decision = decide(7.5, &issues, 3);
        assert!(!decision.needs_revision);
        assert!(decision.explanation.starts_with("Round 3 CONVERGENCE ACHIEVED: Score 7.5/10 ≥ 7.0."));
        assert!(decision.explanation.contains("Remaining 2 issues (1 serious, 1 minor)"));
    }

    #[test]
    fn test_missing_mandatory_section_always_revises() {
        let issues = vec![
            Issue::new(IssueType::MissingSection, "Recommendations", "absent"),
            Issue::new(IssueType::MissingSection, "Appendix", "absent"),
        ];
        let decision = decide(9.9, &issues, 5);
        assert!(decision.needs_revision);
        assert_eq!(
            decision.explanation,
            "Report requires revision due to 1 missing critical sections: ['Recommendations']"
        );
    }

    #[test]
    fn test_standard_levels() {
        assert_eq!(standard_level(9.0), "high standards");
        assert_eq!(standard_level(8.9), "moderate standards");
        assert_eq!(standard_level(7.0), "acceptable standards");
        assert_eq!(standard_level(6.9), "below minimum standards");
    }
}
