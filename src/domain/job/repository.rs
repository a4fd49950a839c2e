//! Job queue and job repository traits

use std::fmt::Debug;

use async_trait::async_trait;

use super::{IngestJob, JobId, JobRecord, JobStatus};
use crate::domain::error::DomainError;

/// Capability interface over the background-job dispatch mechanism.
///
/// `enqueue` is fire-and-forget: it returns as soon as the job is durably
/// handed to the dispatch layer. Workers receive each job at least once.
#[async_trait]
pub trait JobQueue: Send + Sync + Debug {
    /// Hand a job to the dispatch layer
    async fn enqueue(&self, job: IngestJob) -> Result<(), DomainError>;
}

/// Repository for operator-visible job records.
///
/// This bookkeeping is intentionally separate from the document registry:
/// the registry carries the durable, business-meaningful status while the
/// job records carry the operational view (attempts, timings, raw errors).
#[async_trait]
pub trait JobRepository: Send + Sync + Debug {
    /// Create a new job record
    async fn create(&self, record: JobRecord) -> Result<JobRecord, DomainError>;

    /// Get a job record by ID
    async fn get(&self, id: &JobId) -> Result<Option<JobRecord>, DomainError>;

    /// Replace an existing job record
    async fn update(&self, record: &JobRecord) -> Result<(), DomainError>;

    /// List job records by status
    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<JobRecord>, DomainError>;
}
