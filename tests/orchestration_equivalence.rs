//! The loop and graph drivers must make identical routing and round-counting
//! decisions for identical oracle behaviour.

mod common;

use common::{failing_verification, harness, input, verification_json};
use reportloop::adapters::oracle::MockOracle;
use reportloop::domain::models::{DriverKind, RunStatus, Stage, WorkflowState};
use reportloop::domain::ports::RequestKind;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Oracle behaviour shared by both runs.
enum Script {
    Default,
    AlwaysFailing,
    FailOnceThenPass,
    Improving,
    GenerationDown,
}

async fn scripted(script: &Script) -> MockOracle {
    let oracle = MockOracle::new();
    match script {
        Script::Default => {}
        Script::AlwaysFailing => oracle.set_verification_response(failing_verification()).await,
        Script::FailOnceThenPass => {
            oracle
                .queue_verification_responses([failing_verification()])
                .await;
            oracle
                .set_verification_response(verification_json(9.0, &[]))
                .await;
        }
        Script::Improving => {
            oracle
                .queue_verification_responses([
                    failing_verification(),
                    verification_json(
                        7.5,
                        &[(
                            "Recommendation Issue",
                            "Recommendations",
                            "Steps lack owners",
                            "Medium",
                        )],
                    ),
                ])
                .await;
            oracle
                .set_verification_response(verification_json(9.0, &[]))
                .await;
        }
        Script::GenerationDown => {
            oracle
                .fail_kind(RequestKind::GenerateMainSections, "service unavailable")
                .await
        }
    }
    oracle
}

async fn run_one(script: &Script, max_rounds: u32, driver: DriverKind) -> WorkflowState {
    let h = harness(scripted(script).await, common::config(max_rounds, driver));
    h.orchestrator
        .run_with_driver(Uuid::new_v4(), input(&h.dir), driver, &CancellationToken::new())
        .await
}

async fn run_both(script: Script, max_rounds: u32) -> (WorkflowState, WorkflowState) {
    let looped = run_one(&script, max_rounds, DriverKind::Loop).await;
    let graph = run_one(&script, max_rounds, DriverKind::Graph).await;
    (looped, graph)
}

fn summary(state: &WorkflowState) -> Vec<(u32, f64, bool, usize)> {
    state
        .verification_history
        .iter()
        .map(|v| (v.round, v.score, v.needs_revision, v.issues.len()))
        .collect()
}

fn assert_equivalent(looped: &WorkflowState, graph: &WorkflowState) {
    assert_eq!(looped.round, graph.round);
    assert_eq!(looped.status, graph.status);
    assert_eq!(looped.stage, graph.stage);
    assert_eq!(looped.verification_history, graph.verification_history);
    assert_eq!(looped.revision_history, graph.revision_history);
    assert_eq!(looped.current_artifact, graph.current_artifact);
    assert_eq!(looped.error, graph.error);
}

#[tokio::test]
async fn test_drivers_agree_when_budget_is_exhausted() {
    let (looped, graph) = run_both(Script::AlwaysFailing, 3).await;

    assert_equivalent(&looped, &graph);
    assert_eq!(looped.round, 4);
    assert_eq!(looped.verification_history.len(), 3);
    assert_eq!(looped.revision_history.len(), 3);
    assert_eq!(looped.status, RunStatus::Completed);
    assert!(looped.verification_history.iter().all(|v| v.needs_revision));
}

#[tokio::test]
async fn test_drivers_agree_on_early_acceptance() {
    let (looped, graph) = run_both(Script::Default, 5).await;

    assert_equivalent(&looped, &graph);
    assert_eq!(looped.round, 1);
    assert_eq!(looped.verification_history.len(), 1);
    assert!(looped.revision_history.is_empty());
    assert_eq!(graph.stage, Stage::Done);
}

#[tokio::test]
async fn test_drivers_agree_on_convergence_after_revision() {
    let (looped, graph) = run_both(Script::FailOnceThenPass, 5).await;

    assert_equivalent(&looped, &graph);
    assert_eq!(looped.round, 2);
    assert_eq!(
        summary(&looped).iter().map(|s| s.2).collect::<Vec<_>>(),
        vec![true, false]
    );
    assert_eq!(looped.revision_history.len(), 1);
    assert_eq!(looped.revision_history[0].round, 1);
}

#[tokio::test]
async fn test_drivers_agree_when_scores_change_between_rounds() {
    let (looped, graph) = run_both(Script::Improving, 5).await;

    assert_equivalent(&looped, &graph);
    assert_eq!(looped.round, 3);
    assert_eq!(looped.status, RunStatus::Completed);
    assert_eq!(
        summary(&looped).iter().map(|s| (s.0, s.2)).collect::<Vec<_>>(),
        vec![(1, true), (2, true), (3, false)]
    );
    assert_eq!(
        looped.revision_history.iter().map(|r| r.round).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert!(looped.verification_history[0].score < looped.verification_history[2].score);
}

#[tokio::test]
async fn test_drivers_agree_on_generation_failure() {
    let (looped, graph) = run_both(Script::GenerationDown, 3).await;

    assert_equivalent(&looped, &graph);
    assert_eq!(looped.status, RunStatus::Failed);
    assert_eq!(graph.stage, Stage::Error);
    assert!(looped.verification_history.is_empty());
    assert!(looped
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("Report generation failed:")));
}
