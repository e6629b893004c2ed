//! The orchestration state machine.
//!
//! Routing lives in pure functions over [`WorkflowState`]; the work of each
//! stage lives in [`StageExecutor`]. Drivers only decide how to walk the
//! stages, never what a stage does or where it leads.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::errors::DomainError;
use crate::domain::models::progress::{
    revision_step, verification_step, STEP_ANALYSIS, STEP_FINALIZATION, STEP_REPORT_GENERATION,
};
use crate::domain::models::{
    ProgressEvent, RunStatus, Stage, TranscriptSource, WorkflowState,
};
use crate::domain::ports::{ProgressSink, ReportFormatter, Transcriber};
use crate::services::generator::ReportGenerator;
use crate::services::reviser::Reviser;
use crate::services::verifier::{VerificationInput, Verifier};

/// Latest verification asked for another revision.
fn needs_revision(state: &WorkflowState) -> bool {
    state.last_verification().is_some_and(|v| v.needs_revision)
}

/// The current round is still inside the budget.
fn within_budget(state: &WorkflowState) -> bool {
    state.round <= state.max_rounds
}

fn failed(state: &WorkflowState) -> bool {
    state.status == RunStatus::Failed
}

pub fn after_transcription(state: &WorkflowState) -> Stage {
    if failed(state) {
        Stage::Error
    } else {
        Stage::Generate
    }
}

pub fn after_generation(state: &WorkflowState) -> Stage {
    if failed(state) {
        Stage::Error
    } else {
        Stage::Verify
    }
}

pub fn after_verification(state: &WorkflowState) -> Stage {
    if failed(state) {
        Stage::Error
    } else if needs_revision(state) && within_budget(state) {
        Stage::Revise
    } else {
        Stage::Save
    }
}

/// Revision has already advanced the round; leaving the budget forces
/// acceptance of the current artifact.
pub fn after_revision(state: &WorkflowState) -> Stage {
    if failed(state) {
        Stage::Error
    } else if within_budget(state) {
        Stage::Verify
    } else {
        Stage::Save
    }
}

pub fn after_save(state: &WorkflowState) -> Stage {
    if failed(state) {
        Stage::Error
    } else {
        Stage::Done
    }
}

/// The transition function: successor of `state.stage` once it has run.
pub fn next_stage(state: &WorkflowState) -> Stage {
    match state.stage {
        Stage::Transcribe => after_transcription(state),
        Stage::Generate => after_generation(state),
        Stage::Verify => after_verification(state),
        Stage::Revise => after_revision(state),
        Stage::Save => after_save(state),
        Stage::Done => Stage::Done,
        Stage::Error => Stage::Error,
    }
}

/// Collaborators and services that perform stage work.
pub struct StageExecutor {
    pub(crate) generator: ReportGenerator,
    pub(crate) verifier: Verifier,
    pub(crate) reviser: Reviser,
    pub(crate) transcriber: Option<Arc<dyn Transcriber>>,
    pub(crate) formatter: Arc<dyn ReportFormatter>,
    pub(crate) progress: Arc<dyn ProgressSink>,
}

impl StageExecutor {
    /// Run `stage` against `state`. Returns `false` when the job failed.
    ///
    /// Cancellation is checked before any work starts.
    pub async fn run_stage(
        &self,
        stage: Stage,
        state: &mut WorkflowState,
        cancel: &CancellationToken,
    ) -> bool {
        state.stage = stage;
        if cancel.is_cancelled() {
            let err = DomainError::Cancelled(stage.as_str().to_string());
            tracing::warn!(stage = %stage, "workflow cancelled");
            state.fail(err.to_string());
            return false;
        }

        tracing::info!(stage = %stage, round = state.round, "entering stage");
        match stage {
            Stage::Transcribe => self.transcribe(state).await,
            Stage::Generate => self.generate(state).await,
            Stage::Verify => self.verify(state).await,
            Stage::Revise => self.revise(state).await,
            Stage::Save => self.save(state).await,
            Stage::Done | Stage::Error => {}
        }

        if failed(state) {
            state.stage = Stage::Error;
            tracing::error!(stage = %stage, error = ?state.error, "stage failed");
            false
        } else {
            true
        }
    }

    async fn notify(&self, event: ProgressEvent) {
        if let Err(err) = self.progress.notify(event).await {
            tracing::warn!(error = %err, "progress notification failed");
        }
    }

    async fn transcribe(&self, state: &mut WorkflowState) {
        let path = match &state.input.source {
            TranscriptSource::Text { .. } => {
                self.notify(ProgressEvent::start(STEP_ANALYSIS, "Analyzing provided transcript..."))
                    .await;
                self.notify(ProgressEvent::complete(STEP_ANALYSIS, "Transcript ready for analysis."))
                    .await;
                return;
            }
            TranscriptSource::Recording { path } => path.clone(),
        };

        self.notify(ProgressEvent::start(STEP_ANALYSIS, "Transcribing recording...")).await;
        let result = match &self.transcriber {
            Some(transcriber) => {
                transcriber
                    .transcribe(&path, &state.input.output_dir)
                    .await
            }
            None => Err(DomainError::TranscriptionFailed(
                "no transcriber configured".to_string(),
            )),
        };

        match result {
            Ok(transcription) => {
                state.transcript = Some(transcription.text);
                state.transcript_path = Some(transcription.saved_path);
                self.notify(ProgressEvent::complete(STEP_ANALYSIS, "Transcript ready for analysis."))
                    .await;
            }
            Err(err) => {
                self.notify(ProgressEvent::complete(STEP_ANALYSIS, "Transcription failed.")).await;
                state.fail(format!("Transcription failed: {err}"));
            }
        }
    }

    async fn generate(&self, state: &mut WorkflowState) {
        self.notify(ProgressEvent::start(STEP_REPORT_GENERATION, "Generating draft report..."))
            .await;
        let result = self
            .generator
            .generate(
                state.transcript(),
                &state.input.company,
                &state.input.meeting_notes,
                &state.input.additional_instructions,
            )
            .await;

        match result {
            Ok(report) => {
                tracing::info!(chars = report.content.len(), summary = %report.summary, "draft report ready");
                state.replace_artifact(report.content);
                self.notify(ProgressEvent::complete(STEP_REPORT_GENERATION, "Initial report ready."))
                    .await;
            }
            Err(err) => {
                self.notify(ProgressEvent::complete(
                    STEP_REPORT_GENERATION,
                    "Report generation failed.",
                ))
                .await;
                state.fail(format!("Report generation failed: {err}"));
            }
        }
    }

    async fn verify(&self, state: &mut WorkflowState) {
        let round = state.round;
        let step = verification_step(round);
        self.notify(ProgressEvent::start(
            step.clone(),
            format!("Running verification round {round}..."),
        ))
        .await;

        let previous: Vec<_> = state
            .verification_history
            .iter()
            .filter(|v| v.round < round)
            .cloned()
            .collect();
        let notes: Vec<String> = state
            .revision_history
            .iter()
            .filter(|r| r.round < round)
            .map(|r| r.revision_notes.clone())
            .collect();
        let input = VerificationInput {
            artifact: &state.current_artifact,
            transcript: state.transcript(),
            meeting_notes: &state.input.meeting_notes,
            additional_instructions: &state.input.additional_instructions,
            round,
            previous_verifications: &previous,
            previous_revision_notes: &notes,
        };

        match self.verifier.verify(input).await {
            Ok(result) => {
                if let Some(prior) = previous.last() {
                    tracing::info!(
                        round,
                        previous_issues = prior.issue_count(),
                        current_issues = result.issue_count(),
                        "issue trend"
                    );
                }
                state.verification_history.push(result);
                self.notify(ProgressEvent::complete(
                    step,
                    format!("Completed verification round {round}."),
                ))
                .await;
            }
            Err(err) => {
                self.notify(ProgressEvent::complete(
                    step,
                    format!("Verification failed in round {round}."),
                ))
                .await;
                state.fail(format!("Verification failed: {err}"));
            }
        }
    }

    async fn revise(&self, state: &mut WorkflowState) {
        let round = state.round;
        let step = revision_step(round);
        self.notify(ProgressEvent::start(
            step.clone(),
            format!("Applying revisions for round {round}..."),
        ))
        .await;

        let result = match state.last_verification() {
            Some(verification) => {
                self.reviser
                    .revise(&state.current_artifact, verification, round)
                    .await
            }
            None => Err(DomainError::InvalidInput(
                "no verification result to revise against".to_string(),
            )),
        };

        match result {
            Ok(revision) => {
                state.replace_artifact(revision.revised_artifact.clone());
                state.revision_history.push(revision);
                state.round += 1;
                self.notify(ProgressEvent::complete(
                    step,
                    format!("Completed revisions for round {round}."),
                ))
                .await;
            }
            Err(err) => {
                self.notify(ProgressEvent::complete(
                    step,
                    format!("Revision failed in round {round}."),
                ))
                .await;
                state.fail(format!("Revision failed: {err}"));
            }
        }
    }

    async fn save(&self, state: &mut WorkflowState) {
        self.notify(ProgressEvent::start(STEP_FINALIZATION, "Saving final report...")).await;
        let result = self
            .formatter
            .render(
                &state.current_artifact,
                &state.input.company,
                &state.input.output_dir,
            )
            .await;

        match result {
            Ok(path) => {
                state.final_document = Some(path);
                state.status = RunStatus::Completed;
                self.notify(ProgressEvent::complete(STEP_FINALIZATION, "Report finalized.")).await;
            }
            Err(err) => {
                self.notify(ProgressEvent::complete(STEP_FINALIZATION, "Failed to save report."))
                    .await;
                state.fail(format!("Save failed: {err}"));
            }
        }
    }
}
