//! Surgical, section-targeted revision.
//!
//! Only sections with attached issues or suggestions are sent to the oracle,
//! one call per section. Every other section is carried over byte for byte.
//! The artifact is then reassembled in canonical order and any missing
//! mandatory section is backfilled with its placeholder.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use futures::future::join_all;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::revision::{
    modified_section_note, preserved_after_failure_note, revision_summary, NO_MODIFICATION_NOTE,
};
use crate::domain::models::sections::{ensure_heading, SectionMap};
use crate::domain::models::{Issue, RevisionResult, Suggestion, VerificationResult};
use crate::domain::ports::{ContentOracle, OracleRequest, RequestKind};
use crate::services::text_cleanup::clean_oracle_text;

#[derive(Debug, Clone, Default)]
pub struct ReviserConfig {
    /// Issue the per-section oracle calls concurrently.
    pub parallel_sections: bool,
}

pub struct Reviser {
    oracle: Arc<dyn ContentOracle>,
    config: ReviserConfig,
}

/// Findings attached to one section.
#[derive(Debug, Default)]
struct SectionFindings<'a> {
    issues: Vec<&'a Issue>,
    suggestions: Vec<&'a Suggestion>,
}

struct SectionTask<'a> {
    name: String,
    original: String,
    findings: SectionFindings<'a>,
}

enum SectionOutcome {
    Revised(String),
    Preserved,
}

impl Reviser {
    pub fn new(oracle: Arc<dyn ContentOracle>, config: ReviserConfig) -> Self {
        Self { oracle, config }
    }

    pub fn with_defaults(oracle: Arc<dyn ContentOracle>) -> Self {
        Self::new(oracle, ReviserConfig::default())
    }

    /// Revise `artifact` against the findings of `verification`.
    ///
    /// `round` is the round of that verification; the result carries it too.
    pub async fn revise(
        &self,
        artifact: &str,
        verification: &VerificationResult,
        round: u32,
    ) -> DomainResult<RevisionResult> {
        if artifact.trim().is_empty() {
            return Err(DomainError::InvalidInput("report artifact is empty".to_string()));
        }

        let mut sections = SectionMap::parse(artifact);
        let mut findings = group_findings(&verification.issues, &verification.suggestions);

        let tasks: Vec<SectionTask<'_>> = sections
            .iter()
            .filter_map(|section| {
                let attached = findings.remove(section.name.as_str())?;
                Some(SectionTask {
                    name: section.name.clone(),
                    original: section.content.clone(),
                    findings: attached,
                })
            })
            .collect();

        for unmatched in findings.keys() {
            tracing::debug!(section = %unmatched, "findings target a section not in the report");
        }
        tracing::info!(
            round,
            sections = sections.len(),
            targeted = tasks.len(),
            "revising report"
        );

        let outcomes = if self.config.parallel_sections {
            join_all(tasks.iter().map(|task| self.revise_section(task, round))).await
        } else {
            let mut outcomes = Vec::with_capacity(tasks.len());
            for task in &tasks {
                outcomes.push(self.revise_section(task, round).await);
            }
            outcomes
        };

        let mut notes = Vec::new();
        let mut sections_modified = Vec::new();
        for (task, outcome) in tasks.iter().zip(outcomes) {
            match outcome {
                SectionOutcome::Revised(text) => {
                    sections.insert(task.name.clone(), text);
                    notes.push(modified_section_note(&task.name, task.findings.issues.len()));
                    sections_modified.push(task.name.clone());
                }
                SectionOutcome::Preserved => {
                    notes.push(preserved_after_failure_note(&task.name));
                }
            }
        }

        let backfilled = sections.backfill_mandatory();
        if !backfilled.is_empty() {
            tracing::info!(round, sections = ?backfilled, "backfilled missing mandatory sections");
        }

        let revision_notes = if notes.is_empty() {
            NO_MODIFICATION_NOTE.to_string()
        } else {
            notes.join("\n")
        };

        Ok(RevisionResult {
            round,
            issues_addressed: verification.issues.len(),
            suggestions_implemented: verification.suggestions.len(),
            revision_notes,
            revision_summary: revision_summary(verification.issues.len()),
            revised_artifact: sections.reassemble(),
            sections_modified,
        })
    }

    async fn revise_section(&self, task: &SectionTask<'_>, round: u32) -> SectionOutcome {
        tracing::debug!(
            section = %task.name,
            issues = task.findings.issues.len(),
            suggestions = task.findings.suggestions.len(),
            "revising section"
        );
        let prompt = build_section_prompt(&task.name, &task.original, &task.findings, round);
        let request = OracleRequest::new(RequestKind::ReviseSection, prompt).for_section(&task.name);

        match self.oracle.generate(request).await {
            Ok(text) => {
                let cleaned = clean_oracle_text(&text);
                if cleaned.is_empty() {
                    tracing::warn!(section = %task.name, "oracle returned empty section, keeping original");
                    SectionOutcome::Preserved
                } else {
                    SectionOutcome::Revised(ensure_heading(&task.name, &cleaned))
                }
            }
            Err(err) => {
                tracing::warn!(section = %task.name, error = %err, "section revision failed, keeping original");
                SectionOutcome::Preserved
            }
        }
    }
}

/// Attach issues and suggestions to every section they target.
fn group_findings<'a>(
    issues: &'a [Issue],
    suggestions: &'a [Suggestion],
) -> HashMap<&'a str, SectionFindings<'a>> {
    let mut grouped: HashMap<&str, SectionFindings<'_>> = HashMap::new();
    for issue in issues {
        for target in issue.targets() {
            grouped.entry(target.as_str()).or_default().issues.push(issue);
        }
    }
    for suggestion in suggestions {
        for target in suggestion.targets() {
            grouped
                .entry(target.as_str())
                .or_default()
                .suggestions
                .push(suggestion);
        }
    }
    grouped
}

fn build_section_prompt(
    name: &str,
    content: &str,
    findings: &SectionFindings<'_>,
    round: u32,
) -> String {
    let mut issues_text = String::new();
    for (i, issue) in findings.issues.iter().enumerate() {
        let _ = writeln!(issues_text, "{}. {}: {}", i + 1, issue.issue_type, issue.description);
        if issue.has_suggestion() {
            let _ = writeln!(issues_text, "   → {}", issue.suggestion);
        }
        let _ = writeln!(issues_text, "   Severity: {}\n", issue.severity);
    }
    if issues_text.is_empty() {
        issues_text.push_str("No specific issues identified.\n");
    }

    let mut suggestions_text = String::new();
    for (i, suggestion) in findings.suggestions.iter().enumerate() {
        let _ = writeln!(suggestions_text, "{}. {}\n", i + 1, suggestion.description);
    }
    if suggestions_text.is_empty() {
        suggestions_text.push_str("No additional suggestions.\n");
    }

    format!(
        "You edit one section of a consultancy report. Improve ONLY the \"{name}\" section.\n\n\
         REVISION ROUND: {round}\n\n\
         CURRENT SECTION CONTENT:\n{content}\n\n\
         ISSUES TO FIX:\n{issues_text}\n\
         SUGGESTIONS TO IMPLEMENT:\n{suggestions_text}\n\
         RULES:\n\
         1. Identify the paragraphs, sentences or bullets each issue refers to.\n\
         2. Modify only those parts. Copy every other part word for word.\n\
         3. Keep the original structure and order.\n\
         4. Keep the heading exactly as: **{name}:**\n\
         5. Keep facts that were not flagged as incorrect.\n\
         6. Return the complete section as plain text, without code fences.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::oracle::MockOracle;
    use crate::domain::models::sections::MANDATORY_SECTIONS;
    use crate::domain::models::IssueType;

    fn full_report() -> String {
        let mut text = String::from("Company Name: Acme\n\n");
        for name in MANDATORY_SECTIONS {
            text.push_str(&format!("**{name}:**\nOriginal {name} text.\n\n"));
        }
        text
    }

    fn verification(issues: Vec<Issue>, suggestions: Vec<Suggestion>) -> VerificationResult {
        VerificationResult {
            round: 1,
            score: 7.0,
            issues,
            suggestions,
            summary: String::new(),
            strengths: vec![],
            needs_revision: true,
            decision_explanation: String::new(),
            degraded: false,
        }
    }

    #[tokio::test]
    async fn test_only_targeted_sections_are_sent() {
        let oracle = Arc::new(MockOracle::new());
        oracle
            .set_section_response("Data Collection Strategy", "**Data Collection Strategy:**\nRewritten.")
            .await;
        let reviser = Reviser::with_defaults(oracle.clone());

        let issues = vec![Issue::new(
            IssueType::RequiredElementMissing,
            "Data Collection Strategy",
            "storage missing",
        )];
        let report = full_report();
        let result = reviser.revise(&report, &verification(issues, vec![]), 1).await.unwrap();

        let calls = oracle.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].section.as_deref(), Some("Data Collection Strategy"));
        assert_eq!(result.sections_modified, vec!["Data Collection Strategy"]);
        assert_eq!(
            result.revision_notes,
            "• Surgically modified 'Data Collection Strategy': addressed 1 issues with minimal changes"
        );
        assert!(result.revised_artifact.contains("**Data Collection Strategy:**\nRewritten."));

        let before = SectionMap::parse(&report);
        let after = SectionMap::parse(&result.revised_artifact);
        for name in MANDATORY_SECTIONS.iter().filter(|n| **n != "Data Collection Strategy") {
            assert_eq!(before.get(name), after.get(name), "section {name} changed");
        }
    }

    #[tokio::test]
    async fn test_composite_section_revises_both() {
        let oracle = Arc::new(MockOracle::new());
        let reviser = Reviser::with_defaults(oracle.clone());
        let issues = vec![Issue::new(
            IssueType::RequiredElementMissing,
            "AI Maturity Level / Current Solution Development Stage",
            "inconsistent",
        )];
        let result = reviser
            .revise(&full_report(), &verification(issues, vec![]), 2)
            .await
            .unwrap();
        assert_eq!(oracle.calls().await.len(), 2);
        assert_eq!(result.sections_modified.len(), 2);
        assert_eq!(result.round, 2);
    }

    #[tokio::test]
    async fn test_no_findings_means_no_calls() {
        let oracle = Arc::new(MockOracle::new());
        let reviser = Reviser::with_defaults(oracle.clone());
        let report = full_report();
        let result = reviser.revise(&report, &verification(vec![], vec![]), 1).await.unwrap();
        assert!(oracle.calls().await.is_empty());
        assert_eq!(result.revision_notes, NO_MODIFICATION_NOTE);
        assert_eq!(result.revised_artifact, SectionMap::parse(&report).reassemble());
    }

    #[tokio::test]
    async fn test_failed_section_call_keeps_original() {
        let oracle = Arc::new(MockOracle::new());
        oracle.fail_section("Recommendations").await;
        let reviser = Reviser::with_defaults(oracle);
        let suggestions = vec![Suggestion::new("Recommendations", "add timeline")];
        let report = full_report();
        let result = reviser
            .revise(&report, &verification(vec![], suggestions), 1)
            .await
            .unwrap();
        assert!(result.sections_modified.is_empty());
        assert!(result.revised_artifact.contains("Original Recommendations text."));
        assert!(result.revision_notes.contains("Kept 'Recommendations' unchanged"));
        assert_eq!(result.suggestions_implemented, 1);
    }

    #[tokio::test]
    async fn test_missing_sections_are_backfilled() {
        let oracle = Arc::new(MockOracle::new());
        let reviser = Reviser::new(oracle, ReviserConfig { parallel_sections: true });
        let report = full_report().replace("**Recommendations:**\nOriginal Recommendations text.\n\n", "");
        let issues = vec![Issue::new(IssueType::MissingSection, "Recommendations", "absent")];
        let result = reviser.revise(&report, &verification(issues, vec![]), 1).await.unwrap();
        assert_eq!(result.revised_artifact.matches("**Recommendations:**").count(), 1);
        assert!(result.revised_artifact.ends_with(
            "**Recommendations:**\nNo specific recommendations could be made based on the available information."
        ));
    }

    #[test]
    fn test_section_prompt_keeps_heading_contract() {
        let issue = Issue::new(IssueType::ClarityIssue, "Recommendations", "too long")
            .with_suggestion("split into bullets");
        let findings = SectionFindings {
            issues: vec![&issue],
            suggestions: vec![],
        };
        let prompt = build_section_prompt("Recommendations", "**Recommendations:**\nx", &findings, 3);
        assert!(prompt.contains("REVISION ROUND: 3"));
        assert!(prompt.contains("1. Clarity Issue: too long"));
        assert!(prompt.contains("   → split into bullets"));
        assert!(prompt.contains("Keep the heading exactly as: **Recommendations:**"));
        assert!(prompt.contains("No additional suggestions."));
    }
}
