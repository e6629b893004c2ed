//! comfy-table builders for verification history and issue lists.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};

use crate::cli::output::truncate;
use crate::domain::models::{Issue, RevisionResult, VerificationResult};

fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// One row per verification round, joined with that round's revision.
pub fn history_table(verifications: &[VerificationResult], revisions: &[RevisionResult]) -> Table {
    let mut table = list_table(&["round", "score", "issues", "revise", "sections revised"]);
    for verification in verifications {
        let revised = revisions
            .iter()
            .find(|r| r.round == verification.round)
            .map_or_else(|| "-".to_string(), |r| r.sections_modified.len().to_string());
        let mut score = format!("{:.1}", verification.score);
        if verification.degraded {
            score.push_str(" (degraded)");
        }
        table.add_row(vec![
            Cell::new(verification.round),
            Cell::new(score),
            Cell::new(verification.issue_count()),
            Cell::new(if verification.needs_revision { "yes" } else { "no" }),
            Cell::new(revised),
        ]);
    }
    table
}

pub fn issues_table(issues: &[Issue]) -> Table {
    let mut table = list_table(&["severity", "type", "section", "description"]);
    for issue in issues {
        table.add_row(vec![
            Cell::new(issue.severity.as_str()),
            Cell::new(issue.issue_type.as_str()),
            Cell::new(truncate(&issue.section, 30)),
            Cell::new(truncate(&issue.description, 80)),
        ]);
    }
    table
}
