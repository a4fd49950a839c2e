//! Document repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{Document, DocumentId, DocumentStatus};
use crate::domain::error::DomainError;
use crate::domain::job::JobId;

/// Repository trait for the authoritative document registry.
///
/// The registry is the single source of truth for document lifecycle state.
/// Implementations must enforce the monotonic status machine and the
/// set-once job attachment at the storage layer, not just in the entity.
#[async_trait]
pub trait DocumentRepository: Send + Sync + Debug {
    /// Create a new pending document record
    async fn create(&self, document: Document) -> Result<Document, DomainError>;

    /// Get a document by ID
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, DomainError>;

    /// Atomically look up a document by ID and owner.
    ///
    /// This is the only read path used for ownership enforcement; the two
    /// fields are filtered in a single lookup so callers never observe a
    /// document they do not own.
    async fn find_owned(
        &self,
        id: &DocumentId,
        owner_id: &str,
    ) -> Result<Option<Document>, DomainError>;

    /// Attach the dispatched job's ID to a document, exactly once.
    /// A second attach is a conflict.
    async fn attach_job(&self, id: &DocumentId, job_id: &JobId) -> Result<(), DomainError>;

    /// Move a document to a new status. Re-setting the same terminal
    /// status is an idempotent no-op; any other transition out of a
    /// terminal state is a conflict.
    async fn set_status(&self, id: &DocumentId, status: DocumentStatus)
        -> Result<(), DomainError>;
}
