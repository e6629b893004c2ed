use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::ProgressEvent;

/// Receiver of progress notifications.
///
/// Delivery errors are logged by the caller and never change control flow.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn notify(&self, event: ProgressEvent) -> DomainResult<()>;
}
