//! Transcriber that returns a preset transcript.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{Transcriber, Transcription};

use super::whisper::save_transcript;

/// Returns the same text for every recording, or fails when scripted to.
pub struct StaticTranscriber {
    text: String,
    failure: RwLock<Option<String>>,
}

impl StaticTranscriber {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            failure: RwLock::new(None),
        }
    }

    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }
}

#[async_trait]
impl Transcriber for StaticTranscriber {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn transcribe(&self, audio_path: &Path, output_dir: &Path) -> DomainResult<Transcription> {
        if let Some(message) = self.failure.read().await.clone() {
            return Err(DomainError::TranscriptionFailed(message));
        }
        let saved_path = save_transcript(&self.text, audio_path, output_dir).await?;
        Ok(Transcription {
            text: self.text.clone(),
            saved_path,
        })
    }
}
