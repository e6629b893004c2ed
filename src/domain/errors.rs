//! Domain errors for the report convergence engine.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur while producing a report.
///
/// Only [`DomainError::InvalidInput`] and collaborator failures that cannot be
/// degraded move a job into its terminal failed state. Oracle failures during
/// verification are recovered by the verifier and never reach the caller.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Oracle call failed: {0}")]
    OracleFailed(String),

    #[error("Malformed oracle response: {0}")]
    MalformedOracleResponse(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Formatter failed: {0}")]
    FormatterFailed(String),

    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Workflow cancelled before stage '{0}'")]
    Cancelled(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl DomainError {
    /// Whether the error came from the content-generation oracle.
    pub fn is_oracle_error(&self) -> bool {
        matches!(self, Self::OracleFailed(_) | Self::MalformedOracleResponse(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::IoError(err.to_string())
    }
}
