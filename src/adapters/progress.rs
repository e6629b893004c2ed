//! Progress sinks.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ProgressEvent, ProgressStatus};
use crate::domain::ports::ProgressSink;

/// Writes every event to the log.
#[derive(Debug, Clone, Default)]
pub struct LoggingProgressSink;

#[async_trait]
impl ProgressSink for LoggingProgressSink {
    async fn notify(&self, event: ProgressEvent) -> DomainResult<()> {
        let message = event.message.as_deref().unwrap_or_default();
        match event.status {
            ProgressStatus::Start => tracing::info!(step = %event.step, "{message}"),
            ProgressStatus::Complete => tracing::info!(step = %event.step, status = "complete", "{message}"),
        }
        Ok(())
    }
}

/// Forwards events over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelProgressSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgressSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ProgressSink for ChannelProgressSink {
    async fn notify(&self, event: ProgressEvent) -> DomainResult<()> {
        self.tx
            .send(event)
            .map_err(|_| DomainError::IoError("progress receiver dropped".to_string()))
    }
}
