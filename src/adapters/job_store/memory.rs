//! In-memory job store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::JobRecord;
use crate::domain::ports::JobStore;

#[derive(Clone, Default)]
pub struct InMemoryJobStore {
    records: Arc<RwLock<HashMap<Uuid, JobRecord>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, job_id: Uuid, record: JobRecord) -> DomainResult<()> {
        self.records.write().await.insert(job_id, record);
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> DomainResult<Option<JobRecord>> {
        Ok(self.records.read().await.get(&job_id).cloned())
    }

    async fn list(&self) -> DomainResult<Vec<JobRecord>> {
        let mut records: Vec<JobRecord> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}
