use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Start,
    Complete,
}

/// Fire-and-forget notification emitted at stage boundaries.
///
/// Steps are `analysis`, `report_generation`, `verification_N`, `revision_N`
/// and `finalization`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: String,
    pub status: ProgressStatus,
    pub message: Option<String>,
}

impl ProgressEvent {
    pub fn start(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: ProgressStatus::Start,
            message: Some(message.into()),
        }
    }

    pub fn complete(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: ProgressStatus::Complete,
            message: Some(message.into()),
        }
    }
}

pub const STEP_ANALYSIS: &str = "analysis";
pub const STEP_REPORT_GENERATION: &str = "report_generation";
pub const STEP_FINALIZATION: &str = "finalization";

pub fn verification_step(round: u32) -> String {
    format!("verification_{round}")
}

pub fn revision_step(round: u32) -> String {
    format!("revision_{round}")
}
