//! Port traits the orchestration engine depends on.
//!
//! - `ContentOracle`: text generation for drafting, verification and revision
//! - `Transcriber`: speech-to-text for recordings
//! - `ReportFormatter`: document rendering at Save
//! - `JobStore`: keyed job records
//! - `ProgressSink`: fire-and-forget progress notifications

pub mod formatter;
pub mod job_store;
pub mod oracle;
pub mod progress;
pub mod transcriber;

pub use formatter::ReportFormatter;
pub use job_store::JobStore;
pub use oracle::{ContentOracle, OracleRequest, RequestKind};
pub use progress::ProgressSink;
pub use transcriber::{Transcriber, Transcription};
