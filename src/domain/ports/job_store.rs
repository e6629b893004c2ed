use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::JobRecord;

/// Keyed persistence for job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert or overwrite the record for `job_id`.
    async fn put(&self, job_id: Uuid, record: JobRecord) -> DomainResult<()>;

    async fn get(&self, job_id: Uuid) -> DomainResult<Option<JobRecord>>;

    /// All records, newest first.
    async fn list(&self) -> DomainResult<Vec<JobRecord>>;
}
