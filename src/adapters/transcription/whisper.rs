//! Whisper transcription over the OpenAI audio API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{OracleConfig, OracleProvider, TranscriptionConfig};
use crate::domain::ports::{Transcriber, Transcription};

/// Upload limit of the audio endpoint.
pub const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

pub struct WhisperTranscriber {
    client: Client,
    url: String,
    api_key: String,
    azure: bool,
    config: TranscriptionConfig,
}

impl WhisperTranscriber {
    /// Reuses the oracle's credentials and endpoint settings.
    pub fn new(oracle: &OracleConfig, config: TranscriptionConfig) -> DomainResult<Self> {
        let api_key = oracle.resolve_api_key().ok_or_else(|| {
            DomainError::ValidationFailed("no API key configured for transcription".to_string())
        })?;
        let azure = oracle.provider == OracleProvider::Azure;
        let url = match (&oracle.azure_endpoint, azure) {
            (Some(endpoint), true) => format!(
                "{}/openai/deployments/{}/audio/transcriptions?api-version={}",
                endpoint.trim_end_matches('/'),
                config.model,
                oracle.api_version
            ),
            (None, true) => {
                return Err(DomainError::ValidationFailed(
                    "azure provider requires oracle.azure_endpoint".to_string(),
                ))
            }
            _ => format!(
                "{}/audio/transcriptions",
                oracle.base_url.trim_end_matches('/')
            ),
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(oracle.timeout_secs))
            .build()
            .map_err(|e| {
                DomainError::ValidationFailed(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            url,
            api_key,
            azure,
            config,
        })
    }

    async fn upload(&self, audio_path: &Path) -> DomainResult<String> {
        let metadata = tokio::fs::metadata(audio_path).await.map_err(|e| {
            DomainError::TranscriptionFailed(format!("cannot read {}: {e}", audio_path.display()))
        })?;
        if metadata.len() > MAX_UPLOAD_BYTES {
            return Err(DomainError::TranscriptionFailed(format!(
                "{} is {} bytes, larger than the {MAX_UPLOAD_BYTES} byte upload limit",
                audio_path.display(),
                metadata.len()
            )));
        }

        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map_or_else(|| "audio".to_string(), |n| n.to_string_lossy().into_owned());
        let mut form = Form::new()
            .text("model", self.config.model.clone())
            .text("response_format", "text")
            .part("file", Part::bytes(bytes).file_name(file_name));
        if let Some(language) = &self.config.language {
            form = form.text("language", language.clone());
        }

        let request = self.client.post(&self.url).multipart(form);
        let request = if self.azure {
            request.header("api-key", &self.api_key)
        } else {
            request.bearer_auth(&self.api_key)
        };

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::TranscriptionFailed(format!("request failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::TranscriptionFailed(format!("unreadable response: {e}")))?;
        if !status.is_success() {
            return Err(DomainError::TranscriptionFailed(format!("API error {status}: {body}")));
        }
        Ok(body.trim().to_string())
    }
}

/// `<output_dir>/<stem>_transcript.txt`
pub fn transcript_path(audio_path: &Path, output_dir: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map_or_else(|| "recording".to_string(), |s| s.to_string_lossy().into_owned());
    output_dir.join(format!("{stem}_transcript.txt"))
}

/// Write the transcript next to the other job outputs.
pub async fn save_transcript(
    text: &str,
    audio_path: &Path,
    output_dir: &Path,
) -> DomainResult<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path = transcript_path(audio_path, output_dir);
    tokio::fs::write(&path, text).await?;
    Ok(path)
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &'static str {
        "whisper"
    }

    async fn transcribe(&self, audio_path: &Path, output_dir: &Path) -> DomainResult<Transcription> {
        tracing::info!(file = %audio_path.display(), model = %self.config.model, "transcribing recording");
        let text = self.upload(audio_path).await?;
        if text.is_empty() {
            return Err(DomainError::TranscriptionFailed(
                "transcription returned no text".to_string(),
            ));
        }
        let saved_path = save_transcript(&text, audio_path, output_dir).await?;
        tracing::info!(path = %saved_path.display(), chars = text.len(), "transcript saved");
        Ok(Transcription { text, saved_path })
    }
}
