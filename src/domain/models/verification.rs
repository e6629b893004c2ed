//! Verification round results and the oracle verdict they are built from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::issue::{normalize_issues, normalize_suggestions, Issue, Suggestion};
use crate::domain::errors::{DomainError, DomainResult};

/// Neutral score used when the oracle could not be consulted.
pub const DEGRADED_SCORE: f64 = 7.0;

/// Outcome of one verification round. Appended to an append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub round: u32,
    /// Reconciled score in `[1.0, 10.0]`, one decimal.
    pub score: f64,
    /// Issues that survived the round's strictness filter.
    pub issues: Vec<Issue>,
    pub suggestions: Vec<Suggestion>,
    pub summary: String,
    pub strengths: Vec<String>,
    pub needs_revision: bool,
    pub decision_explanation: String,
    /// The oracle failed and the neutral fallback was used.
    #[serde(default)]
    pub degraded: bool,
}

impl VerificationResult {
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }
}

/// Parsed oracle answer to a verification request, before scoring.
#[derive(Debug, Clone, Default)]
pub struct OracleVerdict {
    /// `None` when the oracle's score was missing, non-numeric or non-finite.
    pub score: Option<f64>,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<Suggestion>,
    pub summary: String,
    pub strengths: Vec<String>,
}

impl OracleVerdict {
    /// Parse the oracle's JSON text. Text that is not a JSON object is a
    /// malformed response; individual fields are defaulted leniently.
    pub fn parse(text: &str) -> DomainResult<Self> {
        let body = strip_code_fence(text);
        let value: Value = serde_json::from_str(body)
            .map_err(|e| DomainError::MalformedOracleResponse(e.to_string()))?;
        let obj = value.as_object().ok_or_else(|| {
            DomainError::MalformedOracleResponse("expected a JSON object".to_string())
        })?;

        Ok(Self {
            score: obj.get("score").and_then(parse_score),
            issues: normalize_issues(obj.get("issues")),
            suggestions: normalize_suggestions(obj.get("suggestions")),
            summary: obj
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            strengths: obj
                .get("strengths")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

fn parse_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    score.is_finite().then_some(score)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_verdict() {
        let text = r#"{
            "score": 8.2,
            "issues": [{"type": "Clarity Issue", "section": "Recommendations", "description": "dense"}],
            "suggestions": [{"section": "Recommendations", "description": "split bullets"}],
            "summary": "solid",
            "strengths": ["clear structure", 3]
        }"#;
        let verdict = OracleVerdict::parse(text).unwrap();
        assert_eq!(verdict.score, Some(8.2));
        assert_eq!(verdict.issues.len(), 1);
        assert_eq!(verdict.suggestions.len(), 1);
        assert_eq!(verdict.strengths, vec!["clear structure".to_string()]);
    }

    #[test]
    fn test_invalid_scores_become_none() {
        let verdict = OracleVerdict::parse(r#"{"score": "great"}"#).unwrap();
        assert_eq!(verdict.score, None);
        let verdict = OracleVerdict::parse(r#"{"issues": []}"#).unwrap();
        assert_eq!(verdict.score, None);
        let verdict = OracleVerdict::parse(r#"{"score": "7.5"}"#).unwrap();
        assert_eq!(verdict.score, Some(7.5));
    }

    #[test]
    fn test_malformed_json_is_an_oracle_error() {
        let err = OracleVerdict::parse("Score: 9/10, looks good").unwrap_err();
        assert!(err.is_oracle_error());
        let err = OracleVerdict::parse("[1, 2]").unwrap_err();
        assert!(matches!(err, DomainError::MalformedOracleResponse(_)));
    }

    #[test]
    fn test_fenced_json_is_accepted() {
        let verdict = OracleVerdict::parse("```json\n{\"score\": 9}\n```").unwrap();
        assert_eq!(verdict.score, Some(9.0));
    }
}
