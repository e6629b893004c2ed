use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Transcript text plus the file it was saved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    pub text: String,
    pub saved_path: PathBuf,
}

/// Speech-to-text backend for meeting recordings.
#[async_trait]
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &'static str;

    /// Transcribe `audio_path`, saving the transcript under `output_dir`.
    async fn transcribe(&self, audio_path: &Path, output_dir: &Path) -> DomainResult<Transcription>;
}
