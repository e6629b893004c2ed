//! Per-round issue filtering.

use crate::domain::models::{Issue, Strictness};

/// Keep only the issues that are live under the round's strictness level.
pub fn filter_issues(issues: Vec<Issue>, strictness: Strictness) -> Vec<Issue> {
    let before = issues.len();
    let kept: Vec<Issue> = issues.into_iter().filter(|i| strictness.admits(i)).collect();
    if kept.len() < before {
        tracing::debug!(
            strictness = %strictness,
            dropped = before - kept.len(),
            kept = kept.len(),
            "filtered issues by strictness"
        );
    }
    kept
}
