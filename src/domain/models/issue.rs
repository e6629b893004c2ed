//! Issue and suggestion value objects reported by verification.
//!
//! Oracle output is loosely shaped JSON. Everything is coerced into these
//! types at the boundary ([`normalize_issues`], [`normalize_suggestions`]) so
//! the scoring and decision logic never sees a missing field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sections::section_targets;

pub const DEFAULT_ISSUE_TYPE: &str = "General Issue";
pub const DEFAULT_SECTION: &str = "General";
pub const DEFAULT_DESCRIPTION: &str = "Issue description not provided";
pub const DEFAULT_SUGGESTION: &str = "No specific suggestion provided";

/// Severity of a single issue.
///
/// Ordered so that `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Parse a severity label, accepting the synonyms oracles tend to use.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "high" | "critical" | "severe" => Some(Self::High),
            "medium" | "moderate" | "normal" => Some(Self::Medium),
            "low" | "minor" | "trivial" => Some(Self::Low),
            _ => None,
        }
    }

    /// Score deduction weight before the type multiplier is applied.
    pub fn weight(&self) -> f64 {
        match self {
            Self::High => 2.5,
            Self::Medium => 1.2,
            Self::Low => 0.4,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue taxonomy.
///
/// Unknown labels are preserved in [`IssueType::Other`] so they still reach
/// the revision prompt verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueType {
    MissingSection,
    FactualError,
    SectionOrder,
    RequiredElementMissing,
    RecommendationIssue,
    ClarityIssue,
    Relevance,
    FormatIssue,
    General,
    Other(String),
}

impl IssueType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MissingSection => "Missing Section",
            Self::FactualError => "Factual Error",
            Self::SectionOrder => "Section Order",
            Self::RequiredElementMissing => "Required Element Missing",
            Self::RecommendationIssue => "Recommendation Issue",
            Self::ClarityIssue => "Clarity Issue",
            Self::Relevance => "Relevance",
            Self::FormatIssue => "Format Issue",
            Self::General => DEFAULT_ISSUE_TYPE,
            Self::Other(label) => label,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Missing Section" => Self::MissingSection,
            "Factual Error" => Self::FactualError,
            "Section Order" => Self::SectionOrder,
            "Required Element Missing" => Self::RequiredElementMissing,
            "Recommendation Issue" => Self::RecommendationIssue,
            "Clarity Issue" => Self::ClarityIssue,
            "Relevance" => Self::Relevance,
            "Format Issue" => Self::FormatIssue,
            DEFAULT_ISSUE_TYPE => Self::General,
            other => Self::Other(other.to_string()),
        }
    }

    /// Multiplier applied to the severity weight when scoring.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::FactualError => 1.4,
            Self::MissingSection => 1.3,
            Self::RequiredElementMissing => 1.1,
            Self::ClarityIssue => 0.7,
            _ => 1.0,
        }
    }

    /// Severity assumed when the oracle omits or garbles it.
    pub fn inferred_severity(&self) -> Severity {
        match self {
            Self::MissingSection | Self::FactualError => Severity::High,
            Self::ClarityIssue => Severity::Low,
            _ => Severity::Medium,
        }
    }

    /// Missing Section or Factual Error.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::MissingSection | Self::FactualError)
    }

    /// Structural or content problems that still need fixing in early rounds.
    pub fn is_serious(&self) -> bool {
        matches!(
            self,
            Self::SectionOrder | Self::RequiredElementMissing | Self::RecommendationIssue
        )
    }

    pub fn is_minor(&self) -> bool {
        matches!(self, Self::ClarityIssue)
    }
}

impl From<String> for IssueType {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<IssueType> for String {
    fn from(issue_type: IssueType) -> Self {
        issue_type.as_str().to_string()
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of an issue, as stored in histories and job records.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IssueRecord {
    #[serde(rename = "type")]
    issue_type: IssueType,
    section: String,
    description: String,
    suggestion: String,
    severity: Severity,
}

/// A single defect found in an artifact.
///
/// Composite section names (`"A / B"`) are fanned out once, at construction,
/// into [`Issue::targets`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IssueRecord", into = "IssueRecord")]
pub struct Issue {
    pub issue_type: IssueType,
    pub section: String,
    pub description: String,
    pub suggestion: String,
    pub severity: Severity,
    targets: Vec<String>,
}

impl Issue {
    /// Create an issue whose severity is inferred from its type.
    pub fn new(
        issue_type: IssueType,
        section: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let section = section.into();
        let severity = issue_type.inferred_severity();
        Self {
            targets: section_targets(&section),
            issue_type,
            section,
            description: description.into(),
            suggestion: DEFAULT_SUGGESTION.to_string(),
            severity,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    /// Coerce one raw oracle entry into an issue. Non-objects yield `None`.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        let issue_type = IssueType::from_label(&text_field(obj.get("type"), DEFAULT_ISSUE_TYPE));
        let severity = obj
            .get("severity")
            .and_then(Value::as_str)
            .and_then(Severity::parse_label)
            .unwrap_or_else(|| issue_type.inferred_severity());

        Some(
            Self::new(
                issue_type,
                text_field(obj.get("section"), DEFAULT_SECTION),
                text_field(obj.get("description"), DEFAULT_DESCRIPTION),
            )
            .with_severity(severity)
            .with_suggestion(text_field(obj.get("suggestion"), DEFAULT_SUGGESTION)),
        )
    }

    /// Section names this issue applies to, after composite fan-out.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Whether the oracle supplied a concrete fix.
    pub fn has_suggestion(&self) -> bool {
        !self.suggestion.trim().is_empty() && self.suggestion != DEFAULT_SUGGESTION
    }
}

impl From<IssueRecord> for Issue {
    fn from(record: IssueRecord) -> Self {
        Self {
            targets: section_targets(&record.section),
            issue_type: record.issue_type,
            section: record.section,
            description: record.description,
            suggestion: record.suggestion,
            severity: record.severity,
        }
    }
}

impl From<Issue> for IssueRecord {
    fn from(issue: Issue) -> Self {
        Self {
            issue_type: issue.issue_type,
            section: issue.section,
            description: issue.description,
            suggestion: issue.suggestion,
            severity: issue.severity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SuggestionRecord {
    section: String,
    description: String,
}

/// A free-standing improvement suggestion attached to a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SuggestionRecord", into = "SuggestionRecord")]
pub struct Suggestion {
    pub section: String,
    pub description: String,
    targets: Vec<String>,
}

impl Suggestion {
    pub fn new(section: impl Into<String>, description: impl Into<String>) -> Self {
        let section = section.into();
        Self {
            targets: section_targets(&section),
            section,
            description: description.into(),
        }
    }

    pub fn from_raw(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        Some(Self::new(
            text_field(obj.get("section"), DEFAULT_SECTION),
            text_field(obj.get("description"), ""),
        ))
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }
}

impl From<SuggestionRecord> for Suggestion {
    fn from(record: SuggestionRecord) -> Self {
        Self::new(record.section, record.description)
    }
}

impl From<Suggestion> for SuggestionRecord {
    fn from(suggestion: Suggestion) -> Self {
        Self {
            section: suggestion.section,
            description: suggestion.description,
        }
    }
}

/// Normalize the oracle's `issues` field. Anything that is not an array of
/// objects degrades to fewer (or zero) issues.
pub fn normalize_issues(raw: Option<&Value>) -> Vec<Issue> {
    match raw {
        Some(Value::Array(items)) => items.iter().filter_map(Issue::from_raw).collect(),
        Some(other) => {
            tracing::warn!(kind = value_kind(other), "issues field is not a list, ignoring");
            Vec::new()
        }
        None => Vec::new(),
    }
}

pub fn normalize_suggestions(raw: Option<&Value>) -> Vec<Suggestion> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Suggestion::from_raw)
            .filter(|s| !s.description.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Derive section suggestions from the fixes embedded in issues.
pub fn suggestions_from_issues(issues: &[Issue]) -> Vec<Suggestion> {
    issues
        .iter()
        .filter(|issue| issue.has_suggestion())
        .map(|issue| Suggestion::new(issue.section.clone(), issue.suggestion.clone()))
        .collect()
}

fn text_field(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => default.to_string(),
        Some(other) => other.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
