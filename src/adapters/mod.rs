//! Infrastructure adapters for external systems.

pub mod formatter;
pub mod job_store;
pub mod oracle;
pub mod progress;
pub mod transcription;
