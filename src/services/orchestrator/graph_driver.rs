//! Graph rendering: stages are nodes, routing functions are conditional
//! edges, and the driver walks from the entry node until a terminal stage.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use crate::domain::models::{Stage, WorkflowState};

use super::machine::{
    after_generation, after_revision, after_save, after_transcription, after_verification,
    StageExecutor,
};

/// Upper bound on node visits for one job.
const STEP_LIMIT: usize = 64;

type Edge = fn(&WorkflowState) -> Stage;

pub struct WorkflowGraph {
    entry: Stage,
    edges: HashMap<Stage, Edge>,
}

impl WorkflowGraph {
    pub fn standard() -> Self {
        let mut edges: HashMap<Stage, Edge> = HashMap::new();
        edges.insert(Stage::Transcribe, after_transcription);
        edges.insert(Stage::Generate, after_generation);
        edges.insert(Stage::Verify, after_verification);
        edges.insert(Stage::Revise, after_revision);
        edges.insert(Stage::Save, after_save);
        Self {
            entry: Stage::Transcribe,
            edges,
        }
    }

    pub async fn invoke(
        &self,
        executor: &StageExecutor,
        mut state: WorkflowState,
        cancel: &CancellationToken,
    ) -> WorkflowState {
        let mut node = self.entry;
        for _ in 0..STEP_LIMIT {
            if node.is_terminal() {
                state.stage = node;
                return state;
            }
            let Some(edge) = self.edges.get(&node) else {
                state.fail(format!("no outgoing edge for stage '{node}'"));
                return state;
            };
            executor.run_stage(node, &mut state, cancel).await;
            node = edge(&state);
            tracing::debug!(next = %node, round = state.round, "graph transition");
        }
        state.fail(format!("workflow exceeded {STEP_LIMIT} steps"));
        state
    }
}

impl Default for WorkflowGraph {
    fn default() -> Self {
        Self::standard()
    }
}

pub async fn drive(
    executor: &StageExecutor,
    state: WorkflowState,
    cancel: &CancellationToken,
) -> WorkflowState {
    WorkflowGraph::standard().invoke(executor, state, cancel).await
}
