//! Cross-round verification memory.
//!
//! Rebuilt from the histories at the start of every verification round; it is
//! never mutated in place.

use serde::{Deserialize, Serialize};

use super::issue::{Issue, Severity};
use super::verification::VerificationResult;

/// Round at which verification switches to convergence mode.
pub const CONVERGENCE_ROUND: u32 = 3;

/// How many issue classes survive filtering in a given round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Strict,
    Moderate,
    Lenient,
}

impl Strictness {
    pub fn for_round(round: u32) -> Self {
        match round {
            0 | 1 => Self::Strict,
            2 => Self::Moderate,
            _ => Self::Lenient,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Moderate => "moderate",
            Self::Lenient => "lenient",
        }
    }

    /// Whether an issue stays live under this strictness level.
    ///
    /// Missing Section and Factual Error issues survive every level.
    pub fn admits(&self, issue: &Issue) -> bool {
        let critical = issue.issue_type.is_critical();
        match self {
            Self::Strict => true,
            Self::Moderate => issue.severity >= Severity::Medium || critical,
            Self::Lenient => issue.severity == Severity::High || critical,
        }
    }
}

impl std::fmt::Display for Strictness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leniency factor; the oracle score is raised by `1 - factor` in convergence mode.
pub fn sensitivity_factor(round: u32) -> f64 {
    match round {
        0 | 1 => 1.0,
        2 => 0.8,
        3 => 0.5,
        _ => 0.3,
    }
}

/// A section touched by an earlier revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionAction {
    pub section: String,
    pub action: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMemory {
    pub round: u32,
    /// Every issue section seen in earlier rounds, first occurrence order.
    pub focus_sections: Vec<String>,
    /// Issues from the most recent verification round.
    pub previous_issues: Vec<Issue>,
    /// Issue count summed over all earlier rounds.
    pub previous_issue_count: usize,
    pub strictness: Strictness,
    pub convergence_mode: bool,
    pub sensitivity_factor: f64,
    pub revision_context: Vec<RevisionAction>,
}

impl ContextMemory {
    pub fn build(
        round: u32,
        previous_verifications: &[VerificationResult],
        previous_revision_notes: &[String],
    ) -> Self {
        let mut focus_sections: Vec<String> = Vec::new();
        let mut previous_issue_count = 0;
        for result in previous_verifications {
            previous_issue_count += result.issues.len();
            for issue in &result.issues {
                if !issue.section.is_empty() && !focus_sections.contains(&issue.section) {
                    focus_sections.push(issue.section.clone());
                }
            }
        }

        let previous_issues = previous_verifications
            .last()
            .map(|r| r.issues.clone())
            .unwrap_or_default();

        let revision_context = previous_revision_notes
            .iter()
            .flat_map(|notes| notes.lines())
            .filter_map(parse_revision_note)
            .collect();

        Self {
            round,
            focus_sections,
            previous_issues,
            previous_issue_count,
            strictness: Strictness::for_round(round),
            convergence_mode: round >= CONVERGENCE_ROUND,
            sensitivity_factor: sensitivity_factor(round),
            revision_context,
        }
    }

    /// Raise an oracle score by the convergence allowance, capped at 10.
    pub fn adjust_oracle_score(&self, score: f64) -> f64 {
        if self.convergence_mode {
            (score + (1.0 - self.sensitivity_factor)).min(10.0)
        } else {
            score
        }
    }
}

/// Extract the revised section from a note such as
/// `• Surgically modified 'Data Collection Strategy': addressed 2 issues`.
fn parse_revision_note(line: &str) -> Option<RevisionAction> {
    let line = line.trim();
    let (head, _) = line.split_once(':')?;
    let lowered = head.to_lowercase();
    let verb_at = lowered.find("modified")?;

    let section = match (head.find('\''), head.rfind('\'')) {
        (Some(start), Some(end)) if end > start => head[start + 1..end].trim().to_string(),
        _ => head[verb_at + "modified".len()..]
            .trim_matches(|c: char| c.is_whitespace() || c == '\'')
            .to_string(),
    };
    if section.is_empty() {
        return None;
    }

    Some(RevisionAction {
        section,
        action: "modified".to_string(),
        note: line.to_string(),
    })
}
