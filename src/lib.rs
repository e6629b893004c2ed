//! reportloop - quality-convergence report engine
//!
//! Turns a consultation transcript (or a recording of one) into a structured
//! report, then iterates verification and targeted revision until the report
//! converges or the round budget runs out.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): report models, scoring vocabulary and ports
//! - **Service Layer** (`services`): scoring policy, generation, verification,
//!   revision dispatch and the orchestration state machine
//! - **Adapters** (`adapters`): oracle, transcription, formatting, job storage
//!   and progress implementations
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use reportloop::adapters::{formatter::MarkdownFormatter, oracle::MockOracle, progress::LoggingProgressSink};
//! use reportloop::services::{Orchestrator, OrchestratorConfig, OrchestratorDeps};
//!
//! let orchestrator = Orchestrator::new(
//!     OrchestratorDeps {
//!         oracle: Arc::new(MockOracle::new()),
//!         transcriber: None,
//!         formatter: Arc::new(MarkdownFormatter::new()),
//!         progress: Arc::new(LoggingProgressSink),
//!     },
//!     OrchestratorConfig::default(),
//! );
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    CompanyInfo, Config, DriverKind, Issue, IssueType, RevisionResult, Severity,
    VerificationResult, WorkflowInput, WorkflowOutcome, WorkflowState,
};
pub use domain::ports::{ContentOracle, JobStore, ProgressSink, ReportFormatter, Transcriber};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Orchestrator, OrchestratorConfig, OrchestratorDeps, ReportJobService};
