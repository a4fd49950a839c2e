//! In-memory job repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::job::{JobId, JobRecord, JobRepository, JobStatus};
use crate::domain::DomainError;

/// In-memory implementation of JobRepository
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    jobs: Arc<RwLock<HashMap<String, JobRecord>>>,
}

impl InMemoryJobRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, record: JobRecord) -> Result<JobRecord, DomainError> {
        let mut jobs = self.jobs.write().await;
        let id = record.id().as_str().to_string();

        if jobs.contains_key(&id) {
            return Err(DomainError::conflict(format!("Job '{}' already exists", id)));
        }

        jobs.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: &JobId) -> Result<Option<JobRecord>, DomainError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(id.as_str()).cloned())
    }

    async fn update(&self, record: &JobRecord) -> Result<(), DomainError> {
        let mut jobs = self.jobs.write().await;
        let id = record.id().as_str().to_string();

        if !jobs.contains_key(&id) {
            return Err(DomainError::not_found(format!("Job '{}'", record.id())));
        }

        jobs.insert(id, record.clone());
        Ok(())
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<JobRecord>, DomainError> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .values()
            .filter(|record| record.status() == status)
            .cloned()
            .collect())
    }
}
