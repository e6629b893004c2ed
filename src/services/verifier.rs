//! Context-aware verification of a report artifact.
//!
//! One oracle call per round. Its answer is normalized, filtered by the
//! round's strictness, scored against the computed baseline and turned into
//! a revise/stop decision. Oracle failures degrade to a neutral result
//! instead of failing the job.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::sections::{split_company_preamble, MANDATORY_SECTIONS};
use crate::domain::models::verification::DEGRADED_SCORE;
use crate::domain::models::{
    suggestions_from_issues, ContextMemory, Issue, OracleVerdict, Strictness, VerificationResult,
};
use crate::domain::ports::{ContentOracle, OracleRequest, RequestKind};
use crate::services::generator::SAMPLE_REPORT;
use crate::services::revision_decision::decide;
use crate::services::scoring::reconcile;
use crate::services::strictness::filter_issues;

const PREVIOUS_ISSUE_WINDOW: usize = 10;
const ISSUES_PER_SECTION: usize = 3;
const DESCRIPTION_LIMIT: usize = 150;
const REVISION_ACTION_WINDOW: usize = 3;
const NO_NOTES: &str = "No additional meeting notes provided.";
const NO_INSTRUCTIONS: &str = "No additional instructions provided.";

/// Verifier configuration.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Embed the sample report as a format reference.
    pub include_sample_report: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            include_sample_report: true,
        }
    }
}

/// Everything a verification round needs to know.
#[derive(Debug, Clone, Copy)]
pub struct VerificationInput<'a> {
    pub artifact: &'a str,
    pub transcript: &'a str,
    pub meeting_notes: &'a str,
    pub additional_instructions: &'a str,
    pub round: u32,
    /// Verification results of earlier rounds only.
    pub previous_verifications: &'a [VerificationResult],
    /// Revision notes of earlier rounds only.
    pub previous_revision_notes: &'a [String],
}

pub struct Verifier {
    oracle: Arc<dyn ContentOracle>,
    config: VerifierConfig,
}

impl Verifier {
    pub fn new(oracle: Arc<dyn ContentOracle>, config: VerifierConfig) -> Self {
        Self { oracle, config }
    }

    pub fn with_defaults(oracle: Arc<dyn ContentOracle>) -> Self {
        Self::new(oracle, VerifierConfig::default())
    }

    pub async fn verify(&self, input: VerificationInput<'_>) -> DomainResult<VerificationResult> {
        if input.artifact.trim().is_empty() {
            return Err(DomainError::InvalidInput("report artifact is empty".to_string()));
        }
        if input.transcript.trim().is_empty() {
            return Err(DomainError::InvalidInput("transcript is empty".to_string()));
        }

        let memory = ContextMemory::build(
            input.round,
            input.previous_verifications,
            input.previous_revision_notes,
        );
        tracing::info!(
            round = input.round,
            strictness = %memory.strictness,
            focus_sections = memory.focus_sections.len(),
            convergence_mode = memory.convergence_mode,
            "verifying report"
        );

        let (_, body) = split_company_preamble(input.artifact);
        let sample = self.config.include_sample_report.then_some(SAMPLE_REPORT);
        let prompt = build_verification_prompt(body, &input, &memory, sample);

        let verdict = match self.consult(prompt).await {
            Ok(verdict) => verdict,
            Err(err) => return Ok(degraded_result(input.round, &err)),
        };

        let oracle_score = verdict.score.map(|s| memory.adjust_oracle_score(s));
        let issues = filter_issues(verdict.issues, memory.strictness);
        let score = reconcile(oracle_score, &issues, input.round, &memory.previous_issues);
        let decision = decide(score, &issues, input.round);
        let suggestions = if verdict.suggestions.is_empty() {
            suggestions_from_issues(&issues)
        } else {
            verdict.suggestions
        };

        tracing::info!(
            round = input.round,
            score,
            issues = issues.len(),
            needs_revision = decision.needs_revision,
            explanation = %decision.explanation,
            "verification complete"
        );

        Ok(VerificationResult {
            round: input.round,
            score,
            issues,
            suggestions,
            summary: verdict.summary,
            strengths: verdict.strengths,
            needs_revision: decision.needs_revision,
            decision_explanation: decision.explanation,
            degraded: false,
        })
    }

    async fn consult(&self, prompt: String) -> DomainResult<OracleVerdict> {
        let text = self
            .oracle
            .generate(OracleRequest::new(RequestKind::Verify, prompt))
            .await?;
        OracleVerdict::parse(&text)
    }
}

fn degraded_result(round: u32, err: &DomainError) -> VerificationResult {
    tracing::warn!(round, error = %err, "verification oracle failed, using neutral result");
    let decision = decide(DEGRADED_SCORE, &[], round);
    VerificationResult {
        round,
        score: DEGRADED_SCORE,
        issues: Vec::new(),
        suggestions: Vec::new(),
        summary: format!("verification degraded: {err}"),
        strengths: Vec::new(),
        needs_revision: decision.needs_revision,
        decision_explanation: decision.explanation,
        degraded: true,
    }
}

/// Build the verification prompt for one round.
pub fn build_verification_prompt(
    report_body: &str,
    input: &VerificationInput<'_>,
    memory: &ContextMemory,
    sample_report: Option<&str>,
) -> String {
    let round = input.round;
    let mut prompt = String::new();
    prompt.push_str("You verify AI consultancy reports against their source meeting.\n\n");
    let _ = writeln!(prompt, "**VERIFICATION ROUND: {round}**");

    prompt.push_str(strictness_block(memory.strictness));

    if round > 1 {
        push_resolution_rules(&mut prompt);
    }

    if !memory.focus_sections.is_empty() {
        let _ = write!(
            prompt,
            "\n**FOCUS SECTIONS** (revised in previous rounds):\n{}\n\
             Check that the earlier issues in these sections are adequately addressed.\n",
            memory.focus_sections.join(", ")
        );
    }

    if !memory.previous_issues.is_empty() {
        push_previous_issues(&mut prompt, &memory.previous_issues);
    }

    if !memory.revision_context.is_empty() {
        prompt.push_str("\n**PREVIOUS REVISION ACTIONS:**\n");
        let skip = memory
            .revision_context
            .len()
            .saturating_sub(REVISION_ACTION_WINDOW);
        for action in memory.revision_context.iter().skip(skip) {
            let _ = writeln!(prompt, "- {}: {}", action.section, action.note);
        }
        prompt.push_str(
            "If the original issue in a revised section is addressed, accept it. \
             Do not ask for further polish.\n",
        );
    }

    if let Some(sample) = sample_report {
        let _ = write!(
            prompt,
            "\n**EXPECTED REPORT FORMAT:**\n{sample}\n\
             Flag significant structural deviations from this format as \"Format Issue\".\n"
        );
    }

    let notes = non_empty_or(input.meeting_notes, NO_NOTES);
    let instructions = non_empty_or(input.additional_instructions, NO_INSTRUCTIONS);
    let _ = write!(
        prompt,
        "\n**ORIGINAL CONTEXT:**\n**TRANSCRIPT:** {}\n**MEETING NOTES:** {notes}\n\
         **ADDITIONAL INSTRUCTIONS:** {instructions}\n\n**REPORT TO VERIFY:**\n{report_body}\n",
        input.transcript
    );

    let _ = writeln!(
        prompt,
        "\n**VERIFICATION TASK:**\nAssess the report at the current strictness level ({}).",
        memory.strictness
    );
    prompt.push_str("\n**SECTION COMPLETENESS CHECK:**\nThese sections must be present:\n");
    for (i, name) in MANDATORY_SECTIONS.iter().enumerate() {
        let _ = writeln!(prompt, "{}. **{name}:**", i + 1);
    }

    let _ = write!(prompt, "{}", output_schema(round));
    prompt
}

fn strictness_block(strictness: Strictness) -> &'static str {
    match strictness {
        Strictness::Strict => {
            "\n**COMPREHENSIVE VERIFICATION MODE**\n\
             - Apply the full criteria: accuracy, completeness, clarity, structure\n\
             - Flag issues at every severity level\n"
        }
        Strictness::Moderate => {
            "\n**MODERATE VERIFICATION MODE**\n\
             - Focus on High and significant Medium severity issues\n\
             - Accept minor Low severity issues\n\
             - Prioritize accuracy and completeness over style\n"
        }
        Strictness::Lenient => {
            "\n**LENIENT VERIFICATION MODE**\n\
             - Flag only critical blocking issues (Missing Sections, Factual Errors)\n\
             - Accept minor imperfections so the report can be completed\n"
        }
    }
}

fn push_resolution_rules(prompt: &mut String) {
    prompt.push_str(
        "\n**ANTI-PERFECTIONISM RULES**\n\
         1. RESOLUTION DETECTION: an issue raised earlier that has been adequately addressed is RESOLVED. \
         Do not flag refinements of resolved issues.\n\
         2. GOOD ENOUGH: content that is factually correct and reasonably complete is accepted.\n\
         3. NEW vs REFINEMENT: only report truly new issues (different type, section or concern), \
         never a \"could be more detailed\" variant of an earlier one.\n\
         4. RESOLUTION TEST: if a similar issue existed in the section, was addressed, and the new finding \
         only refines it, do not flag it.\n\
         5. SEVERITY INFLATION: do not raise the severity of earlier low-priority issues or raise the bar between rounds.\n",
    );
}

fn push_previous_issues(prompt: &mut String, previous: &[Issue]) {
    prompt.push_str(
        "\n**PREVIOUS ISSUES IDENTIFIED:**\n\
         (Check whether each has been RESOLVED. If so, do not flag refinements.)\n",
    );

    let window = &previous[previous.len().saturating_sub(PREVIOUS_ISSUE_WINDOW)..];
    let mut grouped: Vec<(&str, Vec<&Issue>)> = Vec::new();
    for issue in window {
        match grouped.iter_mut().find(|(s, _)| *s == issue.section) {
            Some((_, list)) => list.push(issue),
            None => grouped.push((issue.section.as_str(), vec![issue])),
        }
    }

    for (section, issues) in grouped {
        let _ = writeln!(prompt, "\n**{section}:**");
        let skip = issues.len().saturating_sub(ISSUES_PER_SECTION);
        for issue in issues.into_iter().skip(skip) {
            let _ = writeln!(
                prompt,
                "- {} {}: {}\n  → CHECK: Has this been RESOLVED? If YES, do NOT flag refinements.",
                issue.severity,
                issue.issue_type,
                truncate_description(&issue.description)
            );
        }
    }
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_LIMIT {
        let cut: String = description.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{cut}...")
    } else {
        description.to_string()
    }
}

fn output_schema(round: u32) -> String {
    format!(
        r#"
**OUTPUT:**
Return only a JSON object with this structure:
{{
  "score": <number 1-10; apply the good-enough principle>,
  "issues": [
    {{
      "type": "<Missing Section | Factual Error | Required Element Missing | Relevance | Clarity Issue | Recommendation Issue | Format Issue>",
      "section": "<section name>",
      "description": "<a new issue, not a refinement of a resolved one>",
      "suggestion": "<specific fix>",
      "severity": "<High | Medium | Low, judged by round {round} standards>"
    }}
  ],
  "suggestions": [{{"section": "<section name>", "description": "<improvement>"}}],
  "summary": "<overall assessment, noting improvements since earlier rounds>",
  "strengths": ["<strength>"]
}}
"#
    )
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
