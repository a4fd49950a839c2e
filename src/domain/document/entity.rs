//! Document domain entities

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::job::JobId;

/// Regex pattern for valid document IDs: doc-{uuid}
static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^doc-[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$").unwrap()
});

/// Validated document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a new validated document ID
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if !ID_PATTERN.is_match(&id) {
            return Err(DomainError::not_found(format!(
                "Invalid document ID '{}': must be in format doc-{{uuid}}",
                id
            )));
        }
        Ok(Self(id))
    }

    /// Generate a new document ID with UUID
    pub fn generate() -> Self {
        Self(format!("doc-{}", uuid::Uuid::new_v4()))
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lifecycle status of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    /// Uploaded and waiting for (or undergoing) ingestion
    #[default]
    Pending,

    /// Ingestion finished; the document is queryable
    Completed,

    /// Ingestion failed; the document will never become queryable
    Failed,
}

impl DocumentStatus {
    /// Check if this status represents a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check if this status can transition to another status.
    ///
    /// Transitions are monotonic: Pending may move to either terminal
    /// state, terminal states never move again.
    pub fn can_transition_to(&self, target: DocumentStatus) -> bool {
        match (self, target) {
            (Self::Pending, Self::Completed) => true,
            (Self::Pending, Self::Failed) => true,
            _ => false,
        }
    }

    /// Parse a stored status string
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            other => Err(DomainError::storage(format!(
                "Unknown document status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// An uploaded document and its ingestion lifecycle state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier
    id: DocumentId,

    /// Identifier of the uploading principal (JWT subject)
    owner_id: String,

    /// Filename as supplied by the client
    original_name: String,

    /// Collision-free storage key ({uuid}{extension})
    stored_name: String,

    /// Current lifecycle status
    status: DocumentStatus,

    /// Background job processing this document; set once at dispatch
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<JobId>,

    /// When the document record was created
    created_at: DateTime<Utc>,
}

impl Document {
    /// Create a new pending document
    pub fn new(
        original_name: impl Into<String>,
        stored_name: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: DocumentId::generate(),
            owner_id: owner_id.into(),
            original_name: original_name.into(),
            stored_name: stored_name.into(),
            status: DocumentStatus::Pending,
            job_id: None,
            created_at: Utc::now(),
        }
    }

    /// Reconstruct a document from stored fields
    pub fn from_parts(
        id: DocumentId,
        owner_id: String,
        original_name: String,
        stored_name: String,
        status: DocumentStatus,
        job_id: Option<JobId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            original_name,
            stored_name,
            status,
            job_id,
            created_at,
        }
    }

    // Getters

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn stored_name(&self) -> &str {
        &self.stored_name
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Attach the dispatched job's ID. The job ID is set exactly once;
    /// a second attach is a conflict.
    pub fn attach_job(&mut self, job_id: JobId) -> Result<(), DomainError> {
        if let Some(existing) = &self.job_id {
            return Err(DomainError::conflict(format!(
                "Document '{}' already has job '{}' attached",
                self.id, existing
            )));
        }
        self.job_id = Some(job_id);
        Ok(())
    }

    /// Move the document to a new status.
    ///
    /// Re-setting the current terminal status is an idempotent no-op so the
    /// orchestrator can safely re-run after an at-least-once redelivery.
    pub fn set_status(&mut self, target: DocumentStatus) -> Result<(), DomainError> {
        if self.status == target && target.is_terminal() {
            return Ok(());
        }
        if !self.status.can_transition_to(target) {
            return Err(DomainError::conflict(format!(
                "Document '{}' cannot transition from {} to {}",
                self.id, self.status, target
            )));
        }
        self.status = target;
        Ok(())
    }
}
