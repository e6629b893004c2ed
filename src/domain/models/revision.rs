use serde::{Deserialize, Serialize};

/// Outcome of one revision round.
///
/// Shares its `round` with the verification that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionResult {
    pub round: u32,
    pub issues_addressed: usize,
    pub suggestions_implemented: usize,
    /// One line per modified section, or a fixed note when nothing changed.
    pub revision_notes: String,
    pub revision_summary: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub revised_artifact: String,
    pub sections_modified: Vec<String>,
}

/// Note recorded when no section needed an oracle call.
pub const NO_MODIFICATION_NOTE: &str = "No sections required modification";

pub fn modified_section_note(section: &str, issue_count: usize) -> String {
    format!("• Surgically modified '{section}': addressed {issue_count} issues with minimal changes")
}

pub fn preserved_after_failure_note(section: &str) -> String {
    format!("• Kept '{section}' unchanged: revision call failed")
}

pub fn revision_summary(issue_count: usize) -> String {
    format!(
        "Surgical revision: addressed {issue_count} issues with sub-section precision, preserving unchanged content verbatim"
    )
}
