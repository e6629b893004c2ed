//! `reportloop verify`: one verification round against an existing report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::{load_config, oracle_for, read_optional, read_text};
use crate::cli::display::{colorize_score, issues_table};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{clamp_rounds, OracleProvider, VerificationResult};
use crate::services::{VerificationInput, Verifier, VerifierConfig};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Report artifact to verify
    pub report: PathBuf,

    /// Transcript the report was written from
    #[arg(long, short = 't')]
    pub transcript: PathBuf,

    /// Additional meeting notes file
    #[arg(long)]
    pub notes: Option<PathBuf>,

    /// Additional instructions file
    #[arg(long)]
    pub instructions: Option<PathBuf>,

    /// Round to verify as; later rounds are more lenient
    #[arg(long, default_value_t = 1)]
    pub round: u32,

    /// Use the scripted mock oracle instead of a live model
    #[arg(long)]
    pub mock: bool,
}

#[derive(Debug, Serialize)]
pub struct VerifyOutput {
    #[serde(flatten)]
    pub result: VerificationResult,
}

impl CommandOutput for VerifyOutput {
    fn to_human(&self) -> String {
        let result = &self.result;
        let mut lines = vec![
            format!("Round: {}", result.round),
            format!("Score: {}", colorize_score(result.score)),
            format!(
                "Needs revision: {}",
                if result.needs_revision { "yes" } else { "no" }
            ),
            format!("Decision: {}", result.decision_explanation),
        ];
        if !result.summary.is_empty() {
            lines.push(format!("Summary: {}", result.summary));
        }
        if !result.strengths.is_empty() {
            lines.push("\nStrengths:".to_string());
            lines.extend(result.strengths.iter().map(|s| format!("  - {s}")));
        }
        if !result.issues.is_empty() {
            lines.push(String::new());
            lines.push(issues_table(&result.issues).to_string());
        }
        lines.join("\n")
    }
}

pub async fn execute(args: VerifyArgs, config_path: Option<PathBuf>, json_mode: bool) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let mock = args.mock || config.oracle.provider == OracleProvider::Mock;
    let verifier = Verifier::new(
        oracle_for(&config, mock)?,
        VerifierConfig {
            include_sample_report: config.engine.include_sample_report,
        },
    );

    let artifact = read_text(&args.report).await?;
    let transcript = read_text(&args.transcript).await?;
    let notes = read_optional(args.notes.as_deref()).await?;
    let instructions = read_optional(args.instructions.as_deref()).await?;

    let result = verifier
        .verify(VerificationInput {
            artifact: &artifact,
            transcript: &transcript,
            meeting_notes: &notes,
            additional_instructions: &instructions,
            round: clamp_rounds(args.round),
            previous_verifications: &[],
            previous_revision_notes: &[],
        })
        .await
        .context("Verification failed")?;

    output(&VerifyOutput { result }, json_mode);
    Ok(())
}
