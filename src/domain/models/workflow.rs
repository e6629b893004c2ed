//! Workflow state threaded through the orchestration machine, plus the
//! outcome and job records produced from it.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::revision::RevisionResult;
use super::verification::VerificationResult;

/// Hard bounds on the verification round budget.
pub const MIN_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 5;

pub fn clamp_rounds(requested: u32) -> u32 {
    requested.clamp(MIN_ROUNDS, MAX_ROUNDS)
}

const UNKNOWN: &str = "Unknown";

/// Company details supplied with a consultation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInfo {
    pub company_name: String,
    pub country: String,
    pub consultation_date: String,
    pub experts: String,
    pub customer_manager: String,
    pub consultation_type: String,
}

impl CompanyInfo {
    pub fn named(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            ..Self::default()
        }
    }

    /// `(label, value)` pairs in report order, `Unknown` for blanks.
    pub fn labelled_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Company Name", or_unknown_ref(&self.company_name)),
            ("Country", or_unknown_ref(&self.country)),
            ("Consultation Date", or_unknown_ref(&self.consultation_date)),
            ("Expert(s)", or_unknown_ref(&self.experts)),
            ("Customer manager", or_unknown_ref(&self.customer_manager)),
            ("Consultation Type", or_unknown_ref(&self.consultation_type)),
        ]
    }

    pub fn display_name(&self) -> &str {
        or_unknown_ref(&self.company_name)
    }
}

fn or_unknown_ref(value: &str) -> &str {
    if value.trim().is_empty() {
        UNKNOWN
    } else {
        value
    }
}

/// Where the transcript comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptSource {
    Text { transcript: String },
    Recording { path: PathBuf },
}

/// Immutable inputs of one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInput {
    pub source: TranscriptSource,
    pub company: CompanyInfo,
    #[serde(default)]
    pub meeting_notes: String,
    #[serde(default)]
    pub additional_instructions: String,
    pub output_dir: PathBuf,
}

impl WorkflowInput {
    pub fn from_transcript(
        transcript: impl Into<String>,
        company: CompanyInfo,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: TranscriptSource::Text {
                transcript: transcript.into(),
            },
            company,
            meeting_notes: String::new(),
            additional_instructions: String::new(),
            output_dir: output_dir.into(),
        }
    }

    pub fn from_recording(
        path: impl Into<PathBuf>,
        company: CompanyInfo,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: TranscriptSource::Recording { path: path.into() },
            company,
            meeting_notes: String::new(),
            additional_instructions: String::new(),
            output_dir: output_dir.into(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.meeting_notes = notes.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.additional_instructions = instructions.into();
        self
    }
}

/// Stages of the orchestration machine.
///
/// ```text
/// Transcribe → Generate → Verify ⇄ Revise → Save → Done
///          (any failure) → Error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Transcribe,
    Generate,
    Verify,
    Revise,
    Save,
    Done,
    Error,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transcribe => "transcribe",
            Self::Generate => "generate",
            Self::Verify => "verify",
            Self::Revise => "revise",
            Self::Save => "save",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// The single mutable record a job threads through the machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub input: WorkflowInput,
    pub max_rounds: u32,
    pub transcript: Option<String>,
    pub transcript_path: Option<PathBuf>,
    pub current_artifact: String,
    pub artifact_history: Vec<String>,
    /// Current round, starting at 1. Only revision increments it.
    pub round: u32,
    pub verification_history: Vec<VerificationResult>,
    pub revision_history: Vec<RevisionResult>,
    pub stage: Stage,
    pub status: RunStatus,
    pub error: Option<String>,
    pub final_document: Option<PathBuf>,
}

impl WorkflowState {
    pub fn new(input: WorkflowInput, max_rounds: u32) -> Self {
        let transcript = match &input.source {
            TranscriptSource::Text { transcript } => Some(transcript.clone()),
            TranscriptSource::Recording { .. } => None,
        };
        Self {
            input,
            max_rounds: clamp_rounds(max_rounds),
            transcript,
            transcript_path: None,
            current_artifact: String::new(),
            artifact_history: Vec::new(),
            round: 1,
            verification_history: Vec::new(),
            revision_history: Vec::new(),
            stage: Stage::Transcribe,
            status: RunStatus::Running,
            error: None,
            final_document: None,
        }
    }

    pub fn transcript(&self) -> &str {
        self.transcript.as_deref().unwrap_or_default()
    }

    pub fn last_verification(&self) -> Option<&VerificationResult> {
        self.verification_history.last()
    }

    /// Make `artifact` current and append it to the artifact history.
    pub fn replace_artifact(&mut self, artifact: String) {
        self.artifact_history.push(artifact.clone());
        self.current_artifact = artifact;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.status = RunStatus::Failed;
        self.stage = Stage::Error;
    }

    pub fn to_outcome(&self) -> WorkflowOutcome {
        let succeeded = self.status == RunStatus::Completed;
        let final_report = match (&self.final_document, succeeded) {
            (Some(path), true) => Some(FinalReport {
                content: self.current_artifact.clone(),
                doc_path: path.clone(),
            }),
            _ => None,
        };
        WorkflowOutcome {
            status: if succeeded {
                OutcomeStatus::Success
            } else {
                OutcomeStatus::Failed
            },
            error: self.error.clone(),
            company: self.input.company.clone(),
            verification_history: self.verification_history.clone(),
            revision_history: self.revision_history.clone(),
            final_report,
            transcript_path: self.transcript_path.clone(),
            last_artifact: (!self.current_artifact.is_empty())
                .then(|| self.current_artifact.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub content: String,
    pub doc_path: PathBuf,
}

/// User-visible result of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    pub status: OutcomeStatus,
    pub error: Option<String>,
    pub company: CompanyInfo,
    pub verification_history: Vec<VerificationResult>,
    pub revision_history: Vec<RevisionResult>,
    pub final_report: Option<FinalReport>,
    pub transcript_path: Option<PathBuf>,
    /// Last artifact produced, kept even when the job failed.
    pub last_artifact: Option<String>,
}

impl WorkflowOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    pub fn final_score(&self) -> Option<f64> {
        self.verification_history.last().map(|v| v.score)
    }
}

/// Lifecycle of a stored job: `created → running → completed | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Created,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub company: CompanyInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub outcome: Option<WorkflowOutcome>,
}

impl JobRecord {
    pub fn created(job_id: Uuid, company: CompanyInfo) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            status: JobStatus::Created,
            company,
            created_at: now,
            updated_at: now,
            outcome: None,
        }
    }

    pub fn transition(mut self, status: JobStatus) -> Self {
        self.status = status;
        self.updated_at = Utc::now();
        self
    }

    pub fn finish(self, outcome: WorkflowOutcome) -> Self {
        let status = if outcome.is_success() {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        };
        let mut record = self.transition(status);
        record.outcome = Some(outcome);
        record
    }
}
