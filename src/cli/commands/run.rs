//! `reportloop run`: the full transcript-to-report workflow.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{jobs_dir, load_config, oracle_for, read_optional, read_text, CompanyArgs};
use crate::adapters::formatter::MarkdownFormatter;
use crate::adapters::job_store::FileJobStore;
use crate::adapters::progress::LoggingProgressSink;
use crate::adapters::transcription::{StaticTranscriber, WhisperTranscriber};
use crate::cli::display::{colorize_score, colorize_status, history_table};
use crate::cli::output::progress::SpinnerProgressSink;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{DriverKind, OracleProvider, WorkflowInput, WorkflowOutcome};
use crate::domain::ports::{ProgressSink, ReportFormatter, Transcriber};
use crate::services::{Orchestrator, OrchestratorConfig, OrchestratorDeps, ReportJobService};

const MOCK_TRANSCRIPT: &str =
    "Consultant: What are your goals for AI?\nCustomer: We want faster demand forecasting.";

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Transcript text file
    #[arg(required_unless_present = "recording", conflicts_with = "recording")]
    pub transcript: Option<PathBuf>,

    /// Audio recording to transcribe first
    #[arg(long)]
    pub recording: Option<PathBuf>,

    #[command(flatten)]
    pub company: CompanyArgs,

    /// Additional meeting notes file
    #[arg(long)]
    pub notes: Option<PathBuf>,

    /// Additional instructions file
    #[arg(long)]
    pub instructions: Option<PathBuf>,

    /// Maximum verification rounds (clamped to 1-5)
    #[arg(long, short = 'r')]
    pub rounds: Option<u32>,

    /// Orchestration driver: loop or graph
    #[arg(long)]
    pub driver: Option<DriverKind>,

    /// Output directory for transcripts and reports
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Use the scripted mock oracle instead of a live model
    #[arg(long)]
    pub mock: bool,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub job_id: Uuid,
    #[serde(flatten)]
    pub outcome: WorkflowOutcome,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let outcome = &self.outcome;
        let status = if outcome.is_success() { "success" } else { "failed" };
        let mut lines = vec![
            format!("Job: {}", self.job_id),
            format!("Company: {}", outcome.company.display_name()),
            format!("Status: {}", colorize_status(status)),
        ];
        if let Some(score) = outcome.final_score() {
            lines.push(format!("Final score: {}", colorize_score(score)));
        }
        if let Some(report) = &outcome.final_report {
            lines.push(format!("Report: {}", report.doc_path.display()));
        }
        if let Some(path) = &outcome.transcript_path {
            lines.push(format!("Transcript: {}", path.display()));
        }
        if let Some(error) = &outcome.error {
            lines.push(format!("Error: {error}"));
        }
        if !outcome.verification_history.is_empty() {
            lines.push(String::new());
            lines.push(
                history_table(&outcome.verification_history, &outcome.revision_history)
                    .to_string(),
            );
        }
        lines.join("\n")
    }
}

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>, json_mode: bool) -> Result<()> {
    let mut config = load_config(config_path.as_deref())?;
    if let Some(rounds) = args.rounds {
        config.engine.verification_rounds = rounds;
    }
    if let Some(driver) = args.driver {
        config.engine.driver = driver;
    }
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.engine.output_dir.clone());

    let company = args.company.resolve().await?;
    let notes = read_optional(args.notes.as_deref()).await?;
    let instructions = read_optional(args.instructions.as_deref()).await?;

    let input = match (&args.transcript, &args.recording) {
        (Some(path), _) => WorkflowInput::from_transcript(read_text(path).await?, company, &output_dir),
        (None, Some(path)) => WorkflowInput::from_recording(path, company, &output_dir),
        (None, None) => bail!("Provide a transcript file or --recording"),
    }
    .with_notes(notes)
    .with_instructions(instructions);

    let mock = args.mock || config.oracle.provider == OracleProvider::Mock;
    let oracle = oracle_for(&config, mock)?;
    let transcriber: Option<Arc<dyn Transcriber>> = match (&args.recording, mock) {
        (None, _) => None,
        (Some(_), true) => Some(Arc::new(StaticTranscriber::new(MOCK_TRANSCRIPT))),
        (Some(_), false) => Some(Arc::new(WhisperTranscriber::new(
            &config.oracle,
            config.transcription.clone(),
        )?)),
    };

    let spinner = (!json_mode).then(|| Arc::new(SpinnerProgressSink::new()));
    let progress: Arc<dyn ProgressSink> = match &spinner {
        Some(spinner) => spinner.clone(),
        None => Arc::new(LoggingProgressSink),
    };
    let formatter: Arc<dyn ReportFormatter> = Arc::new(MarkdownFormatter::new());

    let orchestrator = Orchestrator::new(
        OrchestratorDeps {
            oracle,
            transcriber,
            formatter: formatter.clone(),
            progress,
        },
        OrchestratorConfig::from_config(&config),
    );
    let service = ReportJobService::new(
        Arc::new(orchestrator),
        Arc::new(FileJobStore::new(jobs_dir())),
        formatter,
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling at the next stage boundary");
            on_interrupt.cancel();
        }
    });

    let (job_id, outcome) = service.submit(input, &cancel).await?;
    if let Some(spinner) = spinner {
        let message = if outcome.is_success() {
            "Report complete"
        } else {
            "Report failed"
        };
        spinner.finish(outcome.is_success(), message);
    }

    let failed = !outcome.is_success();
    output(&RunOutput { job_id, outcome }, json_mode);
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

