//! Ingestion job domain entities

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Regex pattern for valid job IDs: job-{uuid}
static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^job-[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$").unwrap()
});

/// Validated job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Create a new validated job ID
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if !ID_PATTERN.is_match(&id) {
            return Err(DomainError::not_found(format!(
                "Invalid job ID '{}': must be in format job-{{uuid}}",
                id
            )));
        }
        Ok(Self(id))
    }

    /// Generate a new job ID with UUID
    pub fn generate() -> Self {
        Self(format!("job-{}", uuid::Uuid::new_v4()))
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JobId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Payload handed to the background worker for one document.
///
/// Carries everything the worker needs so a delivery can be processed
/// without consulting the enqueuing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestJob {
    /// Job this payload belongs to
    pub job_id: JobId,
    /// Document to process
    pub document_id: String,
    /// Where the uploaded file was stored
    pub file_path: PathBuf,
    /// Client-supplied filename, for diagnostics
    pub original_name: String,
}

/// Operational status of an ingestion job.
///
/// This is the job runner's own bookkeeping, kept separately from the
/// durable [`DocumentStatus`](crate::domain::document::DocumentStatus);
/// the worker writes both and their terminal outcomes must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Enqueued but not yet picked up by a worker
    #[default]
    Queued,

    /// A worker is currently executing the job
    Running,

    /// The job finished successfully
    Succeeded,

    /// The job finished with an error
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn can_transition_to(&self, target: JobStatus) -> bool {
        match (self, target) {
            (Self::Queued, Self::Running) => true,
            (Self::Running, Self::Succeeded) => true,
            (Self::Running, Self::Failed) => true,
            // Redelivery of an already-finished job re-enters Running.
            (Self::Succeeded, Self::Running) => true,
            (Self::Failed, Self::Running) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Operator-visible record of one ingestion job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    id: JobId,

    /// Document this job processes
    document_id: String,

    status: JobStatus,

    /// Error message when the job failed
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,

    /// How many times a worker has picked this job up
    attempts: u32,

    created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Create a new queued job record
    pub fn new(id: JobId, document_id: impl Into<String>) -> Self {
        Self {
            id,
            document_id: document_id.into(),
            status: JobStatus::Queued,
            error: None,
            attempts: 0,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    // Getters

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Mark the job as picked up by a worker. Counts one attempt.
    pub fn mark_running(&mut self) -> Result<(), DomainError> {
        if !self.status.can_transition_to(JobStatus::Running) {
            return Err(DomainError::conflict(format!(
                "Job '{}' cannot move from {} to running",
                self.id, self.status
            )));
        }
        self.status = JobStatus::Running;
        self.attempts += 1;
        self.started_at = Some(Utc::now());
        self.error = None;
        Ok(())
    }

    /// Mark the job as finished successfully
    pub fn mark_succeeded(&mut self) -> Result<(), DomainError> {
        if !self.status.can_transition_to(JobStatus::Succeeded) {
            return Err(DomainError::conflict(format!(
                "Job '{}' cannot move from {} to succeeded",
                self.id, self.status
            )));
        }
        self.status = JobStatus::Succeeded;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Mark the job as failed with an error message
    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), DomainError> {
        if !self.status.can_transition_to(JobStatus::Failed) {
            return Err(DomainError::conflict(format!(
                "Job '{}' cannot move from {} to failed",
                self.id, self.status
            )));
        }
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.finished_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_generate() {
        let id = JobId::generate();
        assert!(id.as_str().starts_with("job-"));
        assert_eq!(id.as_str().len(), 40);
    }

    #[test]
    fn test_job_id_invalid() {
        assert!(JobId::new("job-nope").is_err());
        assert!(JobId::new("doc-12345678-1234-1234-1234-123456789abc").is_err());
    }

    #[test]
    fn test_job_lifecycle() {
        let mut job = JobRecord::new(JobId::generate(), "doc-x");
        assert_eq!(job.status(), JobStatus::Queued);
        assert_eq!(job.attempts(), 0);

        job.mark_running().unwrap();
        assert_eq!(job.status(), JobStatus::Running);
        assert_eq!(job.attempts(), 1);
        assert!(job.started_at().is_some());

        job.mark_succeeded().unwrap();
        assert_eq!(job.status(), JobStatus::Succeeded);
        assert!(job.finished_at().is_some());
    }

    #[test]
    fn test_job_failure_records_error() {
        let mut job = JobRecord::new(JobId::generate(), "doc-x");
        job.mark_running().unwrap();
        job.mark_failed("extraction blew up").unwrap();

        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.error(), Some("extraction blew up"));
    }

    #[test]
    fn test_redelivery_counts_attempts() {
        let mut job = JobRecord::new(JobId::generate(), "doc-x");
        job.mark_running().unwrap();
        job.mark_failed("transient").unwrap();

        // The job mechanism may deliver the same job again.
        job.mark_running().unwrap();
        assert_eq!(job.attempts(), 2);
        assert!(job.error().is_none());

        job.mark_succeeded().unwrap();
        assert_eq!(job.status(), JobStatus::Succeeded);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut job = JobRecord::new(JobId::generate(), "doc-x");
        assert!(job.mark_succeeded().is_err());
        assert!(job.mark_failed("nope").is_err());
    }

    #[test]
    fn test_ingest_job_roundtrip() {
        let job = IngestJob {
            job_id: JobId::generate(),
            document_id: "doc-1".to_string(),
            file_path: PathBuf::from("/uploads/abc.txt"),
            original_name: "notes.txt".to_string(),
        };

        let json = serde_json::to_string(&job).unwrap();
        let parsed: IngestJob = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.job_id, job.job_id);
        assert_eq!(parsed.file_path, job.file_path);
    }
}
