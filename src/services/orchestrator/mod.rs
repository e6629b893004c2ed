//! Quality-convergence orchestration.
//!
//! Transcribe → Generate → Verify ⇄ Revise → Save, with two drivers over
//! the same stage executor and routing functions.

pub mod graph_driver;
pub mod loop_driver;
pub mod machine;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::models::{
    clamp_rounds, Config, DriverKind, WorkflowInput, WorkflowOutcome, WorkflowState,
};
use crate::domain::ports::{ContentOracle, ProgressSink, ReportFormatter, Transcriber};
use crate::services::generator::{GeneratorConfig, ReportGenerator};
use crate::services::reviser::{Reviser, ReviserConfig};
use crate::services::verifier::{Verifier, VerifierConfig};

pub use graph_driver::WorkflowGraph;
pub use machine::{next_stage, StageExecutor};

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub max_rounds: u32,
    pub driver: DriverKind,
    pub parallel_sections: bool,
    pub include_sample_report: bool,
    pub reasoning_model: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            driver: DriverKind::default(),
            parallel_sections: false,
            include_sample_report: true,
            reasoning_model: false,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_rounds: config.engine.verification_rounds,
            driver: config.engine.driver,
            parallel_sections: config.engine.parallel_sections,
            include_sample_report: config.engine.include_sample_report,
            reasoning_model: config.oracle.is_reasoning_model(),
        }
    }
}

/// External collaborators of a job.
pub struct OrchestratorDeps {
    pub oracle: Arc<dyn ContentOracle>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
    pub formatter: Arc<dyn ReportFormatter>,
    pub progress: Arc<dyn ProgressSink>,
}

pub struct Orchestrator {
    executor: StageExecutor,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(deps: OrchestratorDeps, config: OrchestratorConfig) -> Self {
        let executor = StageExecutor {
            generator: ReportGenerator::new(
                deps.oracle.clone(),
                GeneratorConfig {
                    reasoning_model: config.reasoning_model,
                },
            ),
            verifier: Verifier::new(
                deps.oracle.clone(),
                VerifierConfig {
                    include_sample_report: config.include_sample_report,
                },
            ),
            reviser: Reviser::new(
                deps.oracle,
                ReviserConfig {
                    parallel_sections: config.parallel_sections,
                },
            ),
            transcriber: deps.transcriber,
            formatter: deps.formatter,
            progress: deps.progress,
        };
        Self { executor, config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Round budget after clamping to the supported range.
    pub fn max_rounds(&self) -> u32 {
        clamp_rounds(self.config.max_rounds)
    }

    /// Run a job with the configured driver.
    pub async fn run(
        &self,
        job_id: Uuid,
        input: WorkflowInput,
        cancel: &CancellationToken,
    ) -> WorkflowOutcome {
        self.run_with_driver(job_id, input, self.config.driver, cancel)
            .await
            .to_outcome()
    }

    /// Run a job with an explicit driver and return the final state.
    pub async fn run_with_driver(
        &self,
        job_id: Uuid,
        input: WorkflowInput,
        driver: DriverKind,
        cancel: &CancellationToken,
    ) -> WorkflowState {
        let state = WorkflowState::new(input, self.max_rounds());
        let span = tracing::info_span!("job", job_id = %job_id, driver = driver.as_str());

        async {
            tracing::info!(
                company = %state.input.company.display_name(),
                max_rounds = state.max_rounds,
                "starting report workflow"
            );
            let state = match driver {
                DriverKind::Loop => loop_driver::drive(&self.executor, state, cancel).await,
                DriverKind::Graph => graph_driver::drive(&self.executor, state, cancel).await,
            };
            tracing::info!(
                status = ?state.status,
                rounds = state.verification_history.len(),
                revisions = state.revision_history.len(),
                final_score = ?state.last_verification().map(|v| v.score),
                "workflow finished"
            );
            state
        }
        .instrument(span)
        .await
    }
}
