//! Common test utilities for integration tests
//!
//! Builds orchestrators wired to the scripted oracle, an in-memory job
//! store and a channel progress sink, plus fixtures for report artifacts and
//! verification answers.

#![allow(dead_code)]

use std::sync::Arc;

use reportloop::adapters::formatter::MarkdownFormatter;
use reportloop::adapters::job_store::InMemoryJobStore;
use reportloop::adapters::oracle::MockOracle;
use reportloop::adapters::progress::ChannelProgressSink;
use reportloop::domain::models::sections::MANDATORY_SECTIONS;
use reportloop::domain::models::{CompanyInfo, DriverKind, ProgressEvent, WorkflowInput};
use reportloop::services::{
    Orchestrator, OrchestratorConfig, OrchestratorDeps, ReportJobService,
};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

pub const TRANSCRIPT: &str = "Consultant: Tell us about your data.\n\
Customer: We have five years of sales data in spreadsheets.\n\
Consultant: What would you like AI to help with?\n\
Customer: Demand forecasting for our three warehouses.";

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A complete artifact: company preamble, all mandatory sections, footer.
pub fn full_report() -> String {
    report_without(&[])
}

/// A complete artifact missing the named mandatory sections.
pub fn report_without(missing: &[&str]) -> String {
    let mut text = String::from("Company Name: Acme Oy\nCountry: Finland\n\n");
    for name in MANDATORY_SECTIONS.iter().filter(|n| !missing.contains(n)) {
        text.push_str(&format!("**{name}:**\nOriginal text of {name}.\n\n"));
    }
    text
}

/// Oracle verification answer with `(type, section, description, severity)` issues.
pub fn verification_json(score: f64, issues: &[(&str, &str, &str, &str)]) -> String {
    let issues: Vec<serde_json::Value> = issues
        .iter()
        .map(|(issue_type, section, description, severity)| {
            serde_json::json!({
                "type": issue_type,
                "section": section,
                "description": description,
                "suggestion": format!("Fix: {description}"),
                "severity": severity,
            })
        })
        .collect();
    serde_json::json!({
        "score": score,
        "issues": issues,
        "suggestions": [],
        "summary": "scripted verification",
        "strengths": ["Clear structure"],
    })
    .to_string()
}

/// An answer that keeps every round asking for revision.
pub fn failing_verification() -> String {
    verification_json(
        5.0,
        &[(
            "Factual Error",
            "Data Collection Strategy",
            "Warehouse count is wrong",
            "High",
        )],
    )
}

pub fn input(dir: &TempDir) -> WorkflowInput {
    WorkflowInput::from_transcript(TRANSCRIPT, CompanyInfo::named("Acme Oy"), dir.path())
}

pub struct Harness {
    pub oracle: Arc<MockOracle>,
    pub orchestrator: Orchestrator,
    pub events: UnboundedReceiver<ProgressEvent>,
    pub dir: TempDir,
}

pub fn config(max_rounds: u32, driver: DriverKind) -> OrchestratorConfig {
    OrchestratorConfig {
        max_rounds,
        driver,
        ..OrchestratorConfig::default()
    }
}

pub fn harness(oracle: MockOracle, config: OrchestratorConfig) -> Harness {
    let oracle = Arc::new(oracle);
    let (progress, events) = ChannelProgressSink::new();
    let orchestrator = Orchestrator::new(
        OrchestratorDeps {
            oracle: oracle.clone(),
            transcriber: None,
            formatter: Arc::new(MarkdownFormatter::new()),
            progress: Arc::new(progress),
        },
        config,
    );
    Harness {
        oracle,
        orchestrator,
        events,
        dir: temp_dir(),
    }
}

pub fn job_service(oracle: MockOracle, config: OrchestratorConfig) -> (ReportJobService, InMemoryJobStore) {
    let store = InMemoryJobStore::new();
    let formatter = Arc::new(MarkdownFormatter::new());
    let orchestrator = Orchestrator::new(
        OrchestratorDeps {
            oracle: Arc::new(oracle),
            transcriber: None,
            formatter: formatter.clone(),
            progress: Arc::new(reportloop::adapters::progress::LoggingProgressSink),
        },
        config,
    );
    (
        ReportJobService::new(Arc::new(orchestrator), Arc::new(store.clone()), formatter),
        store,
    )
}

/// Drain every progress event emitted so far.
pub fn drain(events: &mut UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}
