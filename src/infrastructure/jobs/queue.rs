//! Tokio mpsc-backed job queue

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::job::{IngestJob, JobQueue};
use crate::domain::DomainError;

/// Receiving end of the job channel, shared by the worker pool.
///
/// The mpsc receiver is single-consumer, so workers take turns holding the
/// lock while waiting for the next delivery.
pub type JobReceiver = Arc<Mutex<UnboundedReceiver<IngestJob>>>;

/// In-process job queue over an unbounded tokio channel.
///
/// `enqueue` returns as soon as the job is in the channel, which is the
/// fire-and-forget contract the upload path relies on.
#[derive(Debug, Clone)]
pub struct TokioJobQueue {
    sender: UnboundedSender<IngestJob>,
}

impl TokioJobQueue {
    /// Create a queue and the receiver its workers will consume from
    pub fn channel() -> (Self, JobReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, Arc::new(Mutex::new(receiver)))
    }
}

#[async_trait]
impl JobQueue for TokioJobQueue {
    async fn enqueue(&self, job: IngestJob) -> Result<(), DomainError> {
        debug!(job_id = %job.job_id, document_id = %job.document_id, "Enqueueing ingestion job");

        self.sender
            .send(job)
            .map_err(|e| DomainError::storage(format!("Job queue is closed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::JobId;
    use std::path::PathBuf;

    fn test_job() -> IngestJob {
        IngestJob {
            job_id: JobId::generate(),
            document_id: "doc-1".to_string(),
            file_path: PathBuf::from("/uploads/x.txt"),
            original_name: "x.txt".to_string(),
        }
    }

    #[tokio::test]
    async fn test_enqueue_delivers_to_receiver() {
        let (queue, receiver) = TokioJobQueue::channel();
        let job = test_job();
        let job_id = job.job_id.clone();

        queue.enqueue(job).await.unwrap();

        let received = receiver.lock().await.recv().await.unwrap();
        assert_eq!(received.job_id, job_id);
    }

    #[tokio::test]
    async fn test_enqueue_after_receiver_dropped_fails() {
        let (queue, receiver) = TokioJobQueue::channel();
        drop(receiver);

        let err = queue.enqueue(test_job()).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }
}
