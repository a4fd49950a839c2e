//! In-memory document repository for development and testing

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::document::{Document, DocumentId, DocumentRepository, DocumentStatus};
use crate::domain::job::JobId;
use crate::domain::DomainError;

/// In-memory implementation of DocumentRepository
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    documents: Arc<RwLock<HashMap<String, Document>>>,
}

impl InMemoryDocumentRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, document: Document) -> Result<Document, DomainError> {
        let mut documents = self.documents.write().await;
        let id = document.id().as_str().to_string();

        if documents.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Document '{}' already exists",
                id
            )));
        }

        documents.insert(id, document.clone());
        Ok(document)
    }

    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, DomainError> {
        let documents = self.documents.read().await;
        Ok(documents.get(id.as_str()).cloned())
    }

    async fn find_owned(
        &self,
        id: &DocumentId,
        owner_id: &str,
    ) -> Result<Option<Document>, DomainError> {
        // Both fields are checked under a single read guard so the lookup
        // is atomic with respect to concurrent writers.
        let documents = self.documents.read().await;
        Ok(documents
            .get(id.as_str())
            .filter(|doc| doc.owner_id() == owner_id)
            .cloned())
    }

    async fn attach_job(&self, id: &DocumentId, job_id: &JobId) -> Result<(), DomainError> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(id.as_str())
            .ok_or_else(|| DomainError::not_found(format!("Document '{}'", id)))?;

        document.attach_job(job_id.clone())
    }

    async fn set_status(
        &self,
        id: &DocumentId,
        status: DocumentStatus,
    ) -> Result<(), DomainError> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(id.as_str())
            .ok_or_else(|| DomainError::not_found(format!("Document '{}'", id)))?;

        document.set_status(status)
    }
}
