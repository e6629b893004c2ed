//! Procedural rendering: run the current stage, ask the transition function
//! for the next one, repeat until a terminal stage.

use tokio_util::sync::CancellationToken;

use crate::domain::models::{Stage, WorkflowState};

use super::machine::{next_stage, StageExecutor};

pub async fn drive(
    executor: &StageExecutor,
    mut state: WorkflowState,
    cancel: &CancellationToken,
) -> WorkflowState {
    let mut stage = Stage::Transcribe;
    while !stage.is_terminal() {
        executor.run_stage(stage, &mut state, cancel).await;
        stage = next_stage(&state);
    }
    state.stage = stage;
    state
}
