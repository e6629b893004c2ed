//! Initial report generation.
//!
//! The first draft is produced in two oracle calls: the nine descriptive
//! sections with the company details, then the Recommendations section
//! written against those main sections.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::sections::{MANDATORY_SECTIONS, RECOMMENDATIONS};
use crate::domain::models::CompanyInfo;
use crate::domain::ports::{ContentOracle, OracleRequest, RequestKind};
use crate::services::text_cleanup::clean_oracle_text;

const SUMMARY_LINES: usize = 3;
const SUMMARY_LIMIT: usize = 500;

/// Format reference for generation and verification.
pub const SAMPLE_REPORT: &str = "\
**AI Maturity Level:**
Northwind Analytics Oy builds scheduling software for regional logistics operators. The product already ships a demand forecasting module trained on customer delivery history, and the team runs monthly releases. AI is in production for one core workflow while the remaining features are still experiments, which places the company at a Moderate AI maturity level.

**Current Solution Development Stage:**
The company is moving from prototype to early implementation for route optimisation. A proof of concept combines the forecasting module with a constraint solver, but it is not yet exposed in the user interface.

**Validity of Concept and Authenticity of Problem Addressed:**
Customers report that manual route planning takes several hours per day. The planned feature addresses this directly and the scope is limited to the planning step, which keeps it feasible with the current team.

**Integration and Importance of AI in the Idea:**
AI supplies the demand estimates that drive route suggestions. Without it the product would fall back to static rules that customers already find too rigid.

**Identified Target Market and Customer Segments:**
Small and medium logistics operators in the Nordic countries, mainly companies running between ten and one hundred vehicles.

**Data Requirement Assessment:**
The solution needs historical delivery records, vehicle capacities and road network data. Delivery records exist for most customers, but vehicle data is incomplete and stored in different formats.

**Data Collection Strategy:**
Delivery data is collected through the existing platform and exported nightly. There is no agreed process for collecting vehicle capacity data, and a shared schema for it should be defined before training new models.

**Technical Expertise and Capability:**
Two developers have hands-on experience with forecasting models and cloud deployment. Optimisation and model monitoring are new areas for the team and may require external support.

**Expectations from FAIR Services:**
Northwind Analytics Oy expects guidance on choosing an optimisation approach, validating forecasts against real routes and planning the rollout to pilot customers.

**Recommendations:**
- Start with a pilot for two customers whose delivery data is complete, and compare suggested routes with planner decisions for four weeks before wider release.

- Define a single schema for vehicle capacity data and collect it through the onboarding flow so that every new customer provides it from the start.

- Use an off-the-shelf constraint solver for the first version and keep the forecasting model separate, so that each part can be evaluated on its own.

- Track forecast error and route acceptance rate per customer, and review both monthly with the pilot customers.

---
**AI Maturity Levels:**

Low:        Early stage companies with an idea or a proof of concept, limited
            data and expertise, and no AI roadmap.

Moderate:   Companies with functional AI solutions that are partly or fully
            integrated into their workflows, supported by developing data
            management processes and a partial AI roadmap.

High:       Companies with advanced AI products, an established customer base,
            mature data management and an AI roadmap.
";

#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Target is a reasoning model, which needs stricter formatting rules.
    pub reasoning_model: bool,
}

/// A freshly generated draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedReport {
    pub content: String,
    pub summary: String,
}

pub struct ReportGenerator {
    oracle: Arc<dyn ContentOracle>,
    config: GeneratorConfig,
}

impl ReportGenerator {
    pub fn new(oracle: Arc<dyn ContentOracle>, config: GeneratorConfig) -> Self {
        Self { oracle, config }
    }

    pub fn with_defaults(oracle: Arc<dyn ContentOracle>) -> Self {
        Self::new(oracle, GeneratorConfig::default())
    }

    /// Generate the first draft of a report.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidInput`] for an empty transcript; oracle errors
    /// are propagated unchanged.
    pub async fn generate(
        &self,
        transcript: &str,
        company: &CompanyInfo,
        meeting_notes: &str,
        additional_instructions: &str,
    ) -> DomainResult<GeneratedReport> {
        if transcript.trim().is_empty() {
            return Err(DomainError::InvalidInput("transcript is empty".to_string()));
        }

        let context = build_full_context(
            transcript,
            meeting_notes,
            additional_instructions,
            self.config.reasoning_model,
        );

        tracing::info!(company = %company.display_name(), "generating main sections");
        let main_prompt = main_sections_prompt(&context, company);
        let main = self
            .oracle
            .generate(OracleRequest::new(RequestKind::GenerateMainSections, main_prompt))
            .await?;
        let main = clean_oracle_text(&main);

        tracing::info!("generating recommendations");
        let recs_prompt = recommendations_prompt(&context, &main);
        let recs = self
            .oracle
            .generate(OracleRequest::new(RequestKind::GenerateRecommendations, recs_prompt))
            .await?;
        let recs = clean_oracle_text(&recs);

        let content = format!("{main}\n\n{recs}\n\n");
        let summary = extract_summary(&content);
        Ok(GeneratedReport { content, summary })
    }
}

/// Assemble the meeting context handed to every generation prompt.
pub fn build_full_context(
    transcript: &str,
    meeting_notes: &str,
    additional_instructions: &str,
    reasoning_model: bool,
) -> String {
    let mut context = format!("\nMEETING TRANSCRIPT:\n\n{transcript}");
    if !meeting_notes.trim().is_empty() {
        context.push_str("\n\nADDITIONAL MEETING NOTES:\n");
        context.push_str(meeting_notes);
    }

    let mut instructions = additional_instructions.trim().to_string();
    if reasoning_model {
        if !instructions.is_empty() {
            instructions.push('\n');
        }
        instructions.push_str(
            "- Do not use bullet points anywhere except in the Recommendations section.\n\
             - In the Recommendations section, follow the sample report's format exactly: \
             a single level of bullet points, no sub-points or sub-sections.",
        );
    }
    if !instructions.is_empty() {
        context.push_str("\n\n ADDITIONAL INSTRUCTIONS:\n\n");
        context.push_str(&instructions);
    }
    context
}

fn main_sections_prompt(context: &str, company: &CompanyInfo) -> String {
    let headings = MANDATORY_SECTIONS
        .iter()
        .filter(|name| **name != RECOMMENDATIONS)
        .map(|name| format!("**{name}:**"))
        .collect::<Vec<_>>()
        .join("\n");
    let details = company
        .labelled_fields()
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Write a post-consultancy AI assessment report from the meeting context below. \
         Follow the structure and tone of the sample report.\n\n\
         Rules:\n\
         - Use only facts from the context. Write 'n/a' when a field cannot be determined.\n\
         - Plain, neutral, professional language.\n\
         - Start with the title \"AI ASSESSMENT AND CONSULTATION\" followed by the company details, one per line.\n\
         - Then write exactly these sections, in this order, each with its bold heading:\n\
         {headings}\n\
         - Do not write the Recommendations section.\n\
         - Plain text only, no code fences.\n\n\
         Company details:\n{details}\n\n\
         CONTEXT:\n{context}\n\n\
         SAMPLE REPORT:\n{SAMPLE_REPORT}"
    )
}

fn recommendations_prompt(context: &str, main_sections: &str) -> String {
    format!(
        "Write only the Recommendations section of the report below, starting with the heading \
         **{RECOMMENDATIONS}:**. Use a single level of bullet points separated by blank lines, \
         grounded in the meeting context and consistent with the main sections. \
         Plain text only, no code fences.\n\n\
         CONTEXT:\n{context}\n\n\
         MAIN SECTIONS:\n{main_sections}\n\n\
         SAMPLE REPORT:\n{SAMPLE_REPORT}"
    )
}

/// First three content lines (not headings), joined and capped.
pub fn extract_summary(content: &str) -> String {
    let summary = content
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("**") && !line.starts_with('#'))
        .take(SUMMARY_LINES)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ");

    if summary.chars().count() > SUMMARY_LIMIT {
        let cut: String = summary.chars().take(SUMMARY_LIMIT).collect();
        format!("{cut}...")
    } else {
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::oracle::MockOracle;
    use crate::domain::models::sections::{SectionMap, MATURITY_FOOTER};

    #[test]
    fn test_sample_report_has_every_mandatory_section() {
        let sections = SectionMap::parse(SAMPLE_REPORT);
        assert!(sections.missing_mandatory().is_empty());
        assert!(sections.contains(MATURITY_FOOTER));
    }

    #[test]
    fn test_full_context_layout() {
        let context = build_full_context("hello", "", "", false);
        assert_eq!(context, "\nMEETING TRANSCRIPT:\n\nhello");

        let context = build_full_context("hello", "notes", "be brief", false);
        assert_eq!(
            context,
            "\nMEETING TRANSCRIPT:\n\nhello\n\nADDITIONAL MEETING NOTES:\nnotes\n\n ADDITIONAL INSTRUCTIONS:\n\nbe brief"
        );
    }

    #[test]
    fn test_reasoning_models_get_formatting_rules() {
        let context = build_full_context("hello", "", "", true);
        assert!(context.contains("ADDITIONAL INSTRUCTIONS"));
        assert!(context.contains("except in the Recommendations section"));
    }

    #[test]
    fn test_summary_skips_headings() {
        let content = "**AI Maturity Level:**\nFirst.\n\n# Title\nSecond.\nThird.\nFourth.";
        assert_eq!(extract_summary(content), "First. Second. Third.");
    }

    #[test]
    fn test_summary_is_capped() {
        let long = "x".repeat(600);
        let summary = extract_summary(&long);
        assert_eq!(summary.len(), 503);
        assert!(summary.ends_with("..."));
    }

    #[tokio::test]
    async fn test_generate_combines_both_steps() {
        let oracle = Arc::new(MockOracle::new());
        oracle
            .set_response(RequestKind::GenerateMainSections, "```\n**AI Maturity Level:**\nLow.\n```")
            .await;
        oracle
            .set_response(RequestKind::GenerateRecommendations, "**Recommendations:**\n- Do it.")
            .await;
        let generator = ReportGenerator::with_defaults(oracle.clone());

        let report = generator
            .generate("transcript", &CompanyInfo::named("Acme"), "", "")
            .await
            .unwrap();
        assert_eq!(
            report.content,
            "**AI Maturity Level:**\nLow.\n\n**Recommendations:**\n- Do it.\n\n"
        );
        assert_eq!(report.summary, "Low. - Do it.");

        let calls = oracle.calls().await;
        assert_eq!(calls.len(), 2);
        assert!(calls[0].prompt.contains("Company Name: Acme"));
        assert!(calls[1].prompt.contains("MAIN SECTIONS:\n**AI Maturity Level:**\nLow."));
    }

    #[tokio::test]
    async fn test_empty_transcript_is_rejected() {
        let generator = ReportGenerator::with_defaults(Arc::new(MockOracle::new()));
        let err = generator
            .generate("  ", &CompanyInfo::default(), "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
