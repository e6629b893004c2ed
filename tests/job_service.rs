//! Job lifecycle through the keyed job service.

mod common;

use std::sync::Arc;

use common::{failing_verification, job_service, temp_dir, TRANSCRIPT};
use reportloop::adapters::formatter::MarkdownFormatter;
use reportloop::adapters::job_store::FileJobStore;
use reportloop::adapters::oracle::MockOracle;
use reportloop::adapters::progress::LoggingProgressSink;
use reportloop::domain::models::{CompanyInfo, DriverKind, JobStatus, OutcomeStatus};
use reportloop::domain::ports::JobStore;
use reportloop::services::{Orchestrator, OrchestratorDeps, ReportJobService};
use reportloop::DomainError;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[tokio::test]
async fn test_each_submission_gets_its_own_record() {
    let (service, store) = job_service(MockOracle::new(), common::config(2, DriverKind::Graph));
    let dir = temp_dir();
    let cancel = CancellationToken::new();

    let (first, _) = service
        .submit_transcript(TRANSCRIPT, CompanyInfo::named("Acme Oy"), "", "", dir.path(), &cancel)
        .await
        .unwrap();
    let (second, _) = service
        .submit_transcript(TRANSCRIPT, CompanyInfo::named("Beta Ab"), "", "", dir.path(), &cancel)
        .await
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(store.len().await, 2);
    let records = service.list().await.unwrap();
    assert!(records.iter().all(|r| r.status == JobStatus::Completed));
    assert_eq!(service.get(second).await.unwrap().company.company_name, "Beta Ab");
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let (service, _) = job_service(MockOracle::new(), common::config(1, DriverKind::Loop));
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.get(missing).await,
        Err(DomainError::JobNotFound(id)) if id == missing
    ));
    assert!(service.render_html(missing).await.is_err());
}

#[tokio::test]
async fn test_exhausted_budget_still_completes_job() {
    let oracle = MockOracle::new();
    oracle.set_verification_response(failing_verification()).await;
    let (service, _) = job_service(oracle, common::config(2, DriverKind::Loop));
    let dir = temp_dir();

    let (job_id, outcome) = service
        .submit_transcript(
            TRANSCRIPT,
            CompanyInfo::named("Acme Oy"),
            "Customer prefers cloud tools.",
            "Keep recommendations short.",
            dir.path(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.verification_history.len(), 2);
    assert_eq!(outcome.revision_history.len(), 2);

    let html = service.render_html(job_id).await.unwrap();
    assert!(html.contains("<div class=\"report\">"));
    assert!(html.contains("Acme Oy"));
}

#[tokio::test]
async fn test_records_survive_a_file_store_round_trip() {
    let jobs = temp_dir();
    let output = temp_dir();
    let store = Arc::new(FileJobStore::new(jobs.path()));
    let formatter = Arc::new(MarkdownFormatter::new());
    let oracle = MockOracle::new();
    oracle.set_verification_response(failing_verification()).await;

    let orchestrator = Orchestrator::new(
        OrchestratorDeps {
            oracle: Arc::new(oracle),
            transcriber: None,
            formatter: formatter.clone(),
            progress: Arc::new(LoggingProgressSink),
        },
        common::config(1, DriverKind::Graph),
    );
    let service = ReportJobService::new(Arc::new(orchestrator), store.clone(), formatter);

    let (job_id, outcome) = service
        .submit_transcript(
            TRANSCRIPT,
            CompanyInfo::named("Acme Oy"),
            "",
            "",
            output.path(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let reopened = FileJobStore::new(jobs.path());
    let record = reopened.get(job_id).await.unwrap().expect("stored record");
    assert_eq!(record.status, JobStatus::Completed);
    assert_eq!(record.outcome.as_ref(), Some(&outcome));

    let issues = &record.outcome.unwrap().verification_history[0].issues;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].section, "Data Collection Strategy");
    assert_eq!(reopened.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancelled_job_is_stored_as_failed() {
    let (service, _) = job_service(MockOracle::new(), common::config(3, DriverKind::Graph));
    let dir = temp_dir();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let (job_id, outcome) = service
        .submit_transcript(TRANSCRIPT, CompanyInfo::named("Acme Oy"), "", "", dir.path(), &cancel)
        .await
        .unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    let record = service.get(job_id).await.unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert!(service.render_html(job_id).await.is_err());
}
