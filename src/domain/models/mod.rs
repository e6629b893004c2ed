pub mod config;
pub mod context_memory;
pub mod issue;
pub mod progress;
pub mod revision;
pub mod sections;
pub mod verification;
pub mod workflow;

pub use config::{
    Config, DriverKind, EngineConfig, LoggingConfig, OracleConfig, OracleProvider,
    RateLimitConfig, RetryConfig, TranscriptionConfig,
};
pub use context_memory::{ContextMemory, RevisionAction, Strictness};
pub use issue::{
    normalize_issues, normalize_suggestions, suggestions_from_issues, Issue, IssueType, Severity,
    Suggestion,
};
pub use progress::{ProgressEvent, ProgressStatus};
pub use revision::RevisionResult;
pub use sections::{Section, SectionMap};
pub use verification::{OracleVerdict, VerificationResult};
pub use workflow::{
    clamp_rounds, CompanyInfo, FinalReport, JobRecord, JobStatus, OutcomeStatus, RunStatus, Stage,
    TranscriptSource, WorkflowInput, WorkflowOutcome, WorkflowState,
};
