//! Keyed job lifecycle around the orchestrator.
//!
//! Every submission gets a fresh UUID and a stored record that moves
//! `created → running → completed | failed`.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CompanyInfo, JobRecord, JobStatus, WorkflowInput, WorkflowOutcome};
use crate::domain::ports::{JobStore, ReportFormatter};
use crate::services::orchestrator::Orchestrator;

pub struct ReportJobService {
    orchestrator: Arc<Orchestrator>,
    store: Arc<dyn JobStore>,
    formatter: Arc<dyn ReportFormatter>,
}

impl ReportJobService {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        store: Arc<dyn JobStore>,
        formatter: Arc<dyn ReportFormatter>,
    ) -> Self {
        Self {
            orchestrator,
            store,
            formatter,
        }
    }

    /// Run a job over an already-available transcript.
    pub async fn submit_transcript(
        &self,
        transcript: impl Into<String>,
        company: CompanyInfo,
        meeting_notes: impl Into<String>,
        additional_instructions: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        cancel: &CancellationToken,
    ) -> DomainResult<(Uuid, WorkflowOutcome)> {
        let input = WorkflowInput::from_transcript(transcript, company, output_dir)
            .with_notes(meeting_notes)
            .with_instructions(additional_instructions);
        self.submit(input, cancel).await
    }

    /// Run a job that starts by transcribing a recording.
    pub async fn submit_recording(
        &self,
        recording: impl Into<PathBuf>,
        company: CompanyInfo,
        meeting_notes: impl Into<String>,
        additional_instructions: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        cancel: &CancellationToken,
    ) -> DomainResult<(Uuid, WorkflowOutcome)> {
        let input = WorkflowInput::from_recording(recording, company, output_dir)
            .with_notes(meeting_notes)
            .with_instructions(additional_instructions);
        self.submit(input, cancel).await
    }

    /// Run a prepared input to completion and store the terminal record.
    ///
    /// Workflow failures are reported through the outcome; only store
    /// failures surface as errors.
    pub async fn submit(
        &self,
        input: WorkflowInput,
        cancel: &CancellationToken,
    ) -> DomainResult<(Uuid, WorkflowOutcome)> {
        let job_id = Uuid::new_v4();
        let record = JobRecord::created(job_id, input.company.clone());
        self.store.put(job_id, record.clone()).await?;

        let record = record.transition(JobStatus::Running);
        self.store.put(job_id, record.clone()).await?;
        tracing::info!(job_id = %job_id, "job running");

        let outcome = self.orchestrator.run(job_id, input, cancel).await;
        self.store
            .put(job_id, record.finish(outcome.clone()))
            .await?;

        if outcome.is_success() {
            tracing::info!(job_id = %job_id, score = ?outcome.final_score(), "job completed");
        } else {
            tracing::warn!(job_id = %job_id, error = ?outcome.error, "job failed");
        }
        Ok((job_id, outcome))
    }

    pub async fn get(&self, job_id: Uuid) -> DomainResult<JobRecord> {
        self.store
            .get(job_id)
            .await?
            .ok_or(DomainError::JobNotFound(job_id))
    }

    pub async fn list(&self) -> DomainResult<Vec<JobRecord>> {
        self.store.list().await
    }

    /// HTML view of a job's report. Failed jobs render their last artifact.
    pub async fn render_html(&self, job_id: Uuid) -> DomainResult<String> {
        let record = self.get(job_id).await?;
        let outcome = record.outcome.as_ref().ok_or_else(|| {
            DomainError::InvalidInput(format!("job {job_id} has not finished"))
        })?;
        let artifact = outcome
            .final_report
            .as_ref()
            .map(|report| report.content.as_str())
            .or(outcome.last_artifact.as_deref())
            .ok_or_else(|| DomainError::InvalidInput(format!("job {job_id} produced no report")))?;
        self.formatter.render_html(artifact, &record.company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::formatter::MarkdownFormatter;
    use crate::adapters::job_store::InMemoryJobStore;
    use crate::adapters::oracle::MockOracle;
    use crate::adapters::progress::LoggingProgressSink;
    use crate::domain::models::OutcomeStatus;
    use crate::domain::ports::RequestKind;
    use crate::services::orchestrator::{OrchestratorConfig, OrchestratorDeps};

    fn service(oracle: MockOracle, store: InMemoryJobStore) -> ReportJobService {
        let formatter: Arc<dyn ReportFormatter> = Arc::new(MarkdownFormatter::new());
        let orchestrator = Orchestrator::new(
            OrchestratorDeps {
                oracle: Arc::new(oracle),
                transcriber: None,
                formatter: formatter.clone(),
                progress: Arc::new(LoggingProgressSink),
            },
            OrchestratorConfig {
                max_rounds: 2,
                ..OrchestratorConfig::default()
            },
        );
        ReportJobService::new(Arc::new(orchestrator), Arc::new(store), formatter)
    }

    #[tokio::test]
    async fn test_completed_job_is_stored() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryJobStore::new();
        let service = service(MockOracle::new(), store.clone());

        let (job_id, outcome) = service
            .submit_transcript(
                "We discussed forecasting.",
                CompanyInfo::named("Acme"),
                "",
                "",
                dir.path(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(outcome.is_success());
        let record = service.get(job_id).await.unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.outcome.unwrap().status, OutcomeStatus::Success);
        assert_eq!(store.len().await, 1);

        let html = service.render_html(job_id).await.unwrap();
        assert!(html.contains("Acme"));
    }

    #[tokio::test]
    async fn test_failed_job_records_error() {
        let dir = tempfile::tempdir().unwrap();
        let oracle = MockOracle::new();
        oracle
            .fail_kind(RequestKind::GenerateMainSections, "upstream down")
            .await;
        let service = service(oracle, InMemoryJobStore::new());

        let (job_id, outcome) = service
            .submit_transcript(
                "Transcript",
                CompanyInfo::named("Acme"),
                "",
                "",
                dir.path(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(outcome
            .error
            .as_deref()
            .unwrap()
            .starts_with("Report generation failed:"));
        let record = service.get(job_id).await.unwrap();
        assert_eq!(record.status, JobStatus::Failed);
        assert!(service.render_html(job_id).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let service = service(MockOracle::new(), InMemoryJobStore::new());
        let id = Uuid::new_v4();
        assert!(matches!(
            service.get(id).await,
            Err(DomainError::JobNotFound(missing)) if missing == id
        ));
    }
}
