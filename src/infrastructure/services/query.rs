//! Query service: ownership-checked retrieval against one document

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::document::{Document, DocumentId, DocumentRepository};
use crate::domain::embedding::{EmbeddingProvider, EmbeddingRole};
use crate::domain::index::VectorIndex;
use crate::domain::DomainError;

/// Separator placed between chunks in the returned context
const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Answer to a document query
#[derive(Debug, Clone)]
pub struct QueryAnswer {
    /// Retrieved chunk texts joined with the context separator
    pub context: String,
    /// How many chunks were retrieved
    pub chunks: usize,
}

/// Read path of the service.
///
/// Never mutates document state; failures surface as typed errors.
#[derive(Debug)]
pub struct QueryService {
    documents: Arc<dyn DocumentRepository>,
    embeddings: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl QueryService {
    /// Create a new query service
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        embeddings: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        top_k: usize,
    ) -> Self {
        Self {
            documents,
            embeddings,
            index,
            top_k,
        }
    }

    /// Retrieve the chunks of `document_id` most similar to `question`.
    ///
    /// A missing document and a document owned by someone else produce
    /// the same error, so a caller can never probe which ids exist.
    #[instrument(skip(self, question), fields(document_id = %document_id))]
    pub async fn answer(
        &self,
        document_id: &DocumentId,
        owner_id: &str,
        question: &str,
    ) -> Result<QueryAnswer, DomainError> {
        let _document = self.find_owned(document_id, owner_id).await?;

        let question_vec = self
            .embeddings
            .embed(&[question.to_string()], EmbeddingRole::Query)
            .await
            .map_err(|e| DomainError::query(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::query("Embedding returned no vector"))?;

        let hits = self
            .index
            .query(&question_vec, document_id.as_str(), self.top_k)
            .await
            .map_err(|e| DomainError::query(e.to_string()))?;

        debug!(hits = hits.len(), "Query retrieved chunks");

        let context = hits
            .iter()
            .map(|hit| hit.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        Ok(QueryAnswer {
            context,
            chunks: hits.len(),
        })
    }

    /// Ownership-checked status lookup used by the polling endpoint.
    pub async fn find_owned(
        &self,
        document_id: &DocumentId,
        owner_id: &str,
    ) -> Result<Document, DomainError> {
        self.documents
            .find_owned(document_id, owner_id)
            .await?
            .ok_or(DomainError::NotFoundOrForbidden)
    }
}
