//! Ingestion pipeline: the state machine driving a document from PENDING
//! to COMPLETED or FAILED
//!
//! One invocation per delivered job, tolerant of at-least-once delivery:
//! extraction, chunking and embedding are recomputable, the vector upsert
//! overwrites deterministically-keyed entries, and terminal status writes
//! are idempotent. Stage failures become a FAILED status write and are
//! then re-surfaced to the worker so the job runner's own bookkeeping
//! records the failure as well.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::domain::document::{DocumentId, DocumentRepository, DocumentStatus};
use crate::domain::embedding::{EmbeddingProvider, EmbeddingRole};
use crate::domain::index::VectorIndex;
use crate::domain::ingestion::{chunk_text, ChunkingConfig};
use crate::domain::job::IngestJob;
use crate::domain::DomainError;
use crate::infrastructure::ingestion::extract_text;

/// Result of a successful ingestion run
#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    pub document_id: DocumentId,
    pub chunks_stored: usize,
}

/// Orchestrates extraction, chunking, embedding and indexing for one
/// document, and owns the document's terminal status write.
#[derive(Debug)]
pub struct IngestionPipeline {
    documents: Arc<dyn DocumentRepository>,
    embeddings: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunking: ChunkingConfig,
}

impl IngestionPipeline {
    /// Create a new pipeline
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        embeddings: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            documents,
            embeddings,
            index,
            chunking,
        }
    }

    /// Process one delivered job.
    #[instrument(skip(self, job), fields(job_id = %job.job_id, document_id = %job.document_id))]
    pub async fn run(&self, job: &IngestJob) -> Result<IngestionOutcome, DomainError> {
        let document_id = DocumentId::new(job.document_id.clone())?;

        // A job for a document that was never recorded is fatal and
        // non-retriable: there is nothing to move to FAILED.
        let Some(document) = self.documents.get(&document_id).await? else {
            error!("Ingestion job references a document that does not exist");
            return Err(DomainError::not_found(format!(
                "Document '{}' for job '{}'",
                job.document_id, job.job_id
            )));
        };

        match self.process(document.stored_name(), job).await {
            Ok(chunks_stored) => {
                self.documents
                    .set_status(&document_id, DocumentStatus::Completed)
                    .await?;
                info!(chunks_stored, "Document ingestion completed");
                Ok(IngestionOutcome {
                    document_id,
                    chunks_stored,
                })
            }
            Err(err) => {
                error!(error = %err, "Document ingestion failed");
                // Record the durable FAILED status, then re-raise the
                // original error so the job runner records it too.
                if let Err(status_err) = self
                    .documents
                    .set_status(&document_id, DocumentStatus::Failed)
                    .await
                {
                    warn!(error = %status_err, "Could not record FAILED status");
                }
                Err(err)
            }
        }
    }

    async fn process(&self, stored_name: &str, job: &IngestJob) -> Result<usize, DomainError> {
        let path = job.file_path.clone();
        let text = tokio::task::spawn_blocking(move || extract_text(&path))
            .await
            .map_err(|e| DomainError::extraction(format!("Extraction task failed: {}", e)))??;

        let chunks = chunk_text(&text, &self.chunking)?;
        let vectors = self
            .embeddings
            .embed(&chunks, EmbeddingRole::Passage)
            .await?;

        self.index
            .upsert(&job.document_id, stored_name, &chunks, &vectors)
            .await
    }
}
