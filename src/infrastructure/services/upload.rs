//! Upload service: persist the file, record the document, dispatch the job

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::document::{Document, DocumentId, DocumentRepository};
use crate::domain::job::{IngestJob, JobId, JobQueue, JobRecord, JobRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::UploadStore;

/// What the caller gets back from a successful upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub document_id: DocumentId,
    pub job_id: JobId,
}

/// Synchronous half of the ingestion flow.
///
/// By the time `upload` returns, the file is on disk, the document row
/// exists, the job is with the dispatch layer, and the job id is
/// persisted on the row, so a client holding a receipt is guaranteed the
/// job exists. Any earlier failure aborts before the enqueue, so no
/// orphaned job can reference a document that failed to persist.
#[derive(Debug)]
pub struct UploadService {
    store: UploadStore,
    documents: Arc<dyn DocumentRepository>,
    jobs: Arc<dyn JobRepository>,
    queue: Arc<dyn JobQueue>,
}

impl UploadService {
    /// Create a new upload service
    pub fn new(
        store: UploadStore,
        documents: Arc<dyn DocumentRepository>,
        jobs: Arc<dyn JobRepository>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            store,
            documents,
            jobs,
            queue,
        }
    }

    /// Accept an uploaded file for `owner_id` and queue it for ingestion.
    ///
    /// Creation is two-phase: the document row is written first (PENDING,
    /// no job id), then the job id is attached after the enqueue. Between
    /// those writes a status poll can observe the row without a job id.
    #[instrument(skip(self, bytes))]
    pub async fn upload(
        &self,
        owner_id: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<UploadReceipt, DomainError> {
        let stored = self.store.save(original_name, bytes).await?;

        let document = Document::new(original_name, &stored.stored_name, owner_id);
        let document = self.documents.create(document).await?;
        let document_id = document.id().clone();

        let job_id = JobId::generate();
        self.jobs
            .create(JobRecord::new(job_id.clone(), document_id.as_str()))
            .await?;

        self.queue
            .enqueue(IngestJob {
                job_id: job_id.clone(),
                document_id: document_id.as_str().to_string(),
                file_path: stored.path,
                original_name: original_name.to_string(),
            })
            .await?;

        self.documents.attach_job(&document_id, &job_id).await?;

        info!(document_id = %document_id, job_id = %job_id, "Upload accepted and queued");

        Ok(UploadReceipt {
            document_id,
            job_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::document::DocumentStatus;
    use crate::domain::job::JobStatus;
    use crate::infrastructure::document::InMemoryDocumentRepository;
    use crate::infrastructure::jobs::{InMemoryJobRepository, TokioJobQueue};

    struct Fixture {
        documents: Arc<InMemoryDocumentRepository>,
        jobs: Arc<InMemoryJobRepository>,
        receiver: crate::infrastructure::jobs::JobReceiver,
        service: UploadService,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();
        let documents = Arc::new(InMemoryDocumentRepository::new());
        let jobs = Arc::new(InMemoryJobRepository::new());
        let (queue, receiver) = TokioJobQueue::channel();
        let service = UploadService::new(
            store,
            documents.clone(),
            jobs.clone(),
            Arc::new(queue),
        );
        Fixture {
            documents,
            jobs,
            receiver,
            service,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_upload_creates_record_and_dispatches_job() {
        let fx = fixture();

        let receipt = fx
            .service
            .upload("owner-1", "notes.txt", b"hello world")
            .await
            .unwrap();

        // Document row: pending, owned, job attached.
        let doc = fx
            .documents
            .get(&receipt.document_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.status(), DocumentStatus::Pending);
        assert_eq!(doc.owner_id(), "owner-1");
        assert_eq!(doc.original_name(), "notes.txt");
        assert_eq!(doc.job_id(), Some(&receipt.job_id));
        assert!(doc.stored_name().ends_with(".txt"));

        // Job record: queued, linked back to the document.
        let record = fx.jobs.get(&receipt.job_id).await.unwrap().unwrap();
        assert_eq!(record.status(), JobStatus::Queued);
        assert_eq!(record.document_id(), receipt.document_id.as_str());

        // The payload is with the dispatch layer and points at the file.
        let job = fx.receiver.lock().await.recv().await.unwrap();
        assert_eq!(job.job_id, receipt.job_id);
        assert_eq!(job.document_id, receipt.document_id.as_str());
        assert_eq!(std::fs::read(&job.file_path).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_upload_failure_enqueues_nothing() {
        let fx = fixture();
        // Close the dispatch layer so the enqueue fails.
        {
            let mut receiver = fx.receiver.lock().await;
            receiver.close();
        }

        let err = fx
            .service
            .upload("owner-1", "notes.txt", b"hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));

        // The document row exists but never got a job id: the failure
        // happened after the record write and before dispatch finished.
        // No job can ever run for it.
        let queued = fx.jobs.list_by_status(JobStatus::Running).await.unwrap();
        assert!(queued.is_empty());
    }

    #[tokio::test]
    async fn test_two_uploads_same_name_are_distinct_documents() {
        let fx = fixture();

        let first = fx.service.upload("owner-1", "a.txt", b"one").await.unwrap();
        let second = fx.service.upload("owner-1", "a.txt", b"two").await.unwrap();

        assert_ne!(first.document_id, second.document_id);
        assert_ne!(first.job_id, second.job_id);

        let doc_a = fx.documents.get(&first.document_id).await.unwrap().unwrap();
        let doc_b = fx.documents.get(&second.document_id).await.unwrap().unwrap();
        assert_ne!(doc_a.stored_name(), doc_b.stored_name());
    }
}
