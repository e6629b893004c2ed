//! Application services: scoring policy, report generation, verification,
//! revision dispatch and orchestration.

pub mod generator;
pub mod job_service;
pub mod orchestrator;
pub mod revision_decision;
pub mod reviser;
pub mod scoring;
pub mod strictness;
pub mod text_cleanup;
pub mod verifier;

pub use generator::{GeneratedReport, GeneratorConfig, ReportGenerator};
pub use job_service::ReportJobService;
pub use orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorDeps};
pub use revision_decision::RevisionDecision;
pub use reviser::{Reviser, ReviserConfig};
pub use verifier::{VerificationInput, Verifier, VerifierConfig};
