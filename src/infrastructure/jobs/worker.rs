//! Ingestion worker pool
//!
//! Workers drain the job channel and run the ingestion pipeline. The
//! pipeline writes the durable document status; the worker writes the
//! operational job record. Both observe the same run, and their terminal
//! outcomes must agree; the worker is the single writer informing both.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::queue::JobReceiver;
use crate::domain::job::{IngestJob, JobRepository};
use crate::infrastructure::services::IngestionPipeline;

/// Spawn `count` workers consuming from the shared receiver.
///
/// Workers exit when the queue's sender side is dropped and the channel
/// drains.
pub fn spawn_workers(
    count: usize,
    receiver: JobReceiver,
    pipeline: Arc<IngestionPipeline>,
    jobs: Arc<dyn JobRepository>,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|worker| {
            let receiver = receiver.clone();
            let pipeline = pipeline.clone();
            let jobs = jobs.clone();

            tokio::spawn(async move {
                info!(worker, "Ingestion worker started");
                loop {
                    let job = { receiver.lock().await.recv().await };
                    match job {
                        Some(job) => process_delivery(worker, &job, &pipeline, &jobs).await,
                        None => {
                            info!(worker, "Job queue closed, worker stopping");
                            break;
                        }
                    }
                }
            })
        })
        .collect()
}

async fn process_delivery(
    worker: usize,
    job: &IngestJob,
    pipeline: &IngestionPipeline,
    jobs: &Arc<dyn JobRepository>,
) {
    info!(worker, job_id = %job.job_id, document_id = %job.document_id, "Job delivered");

    let mut record = match jobs.get(&job.job_id).await {
        Ok(Some(record)) => Some(record),
        Ok(None) => {
            warn!(job_id = %job.job_id, "No job record for delivery; processing anyway");
            None
        }
        Err(err) => {
            warn!(job_id = %job.job_id, error = %err, "Could not load job record");
            None
        }
    };

    if let Some(record) = record.as_mut() {
        if let Err(err) = record.mark_running() {
            warn!(job_id = %job.job_id, error = %err, "Job record refused running transition");
        } else if let Err(err) = jobs.update(record).await {
            warn!(job_id = %job.job_id, error = %err, "Could not persist running status");
        }
    }

    let run_result = pipeline.run(job).await;

    if let Some(record) = record.as_mut() {
        let transition = match &run_result {
            Ok(outcome) => {
                info!(job_id = %job.job_id, chunks = outcome.chunks_stored, "Job succeeded");
                record.mark_succeeded()
            }
            Err(err) => {
                error!(job_id = %job.job_id, error = %err, "Job failed");
                record.mark_failed(err.to_string())
            }
        };

        if let Err(err) = transition {
            warn!(job_id = %job.job_id, error = %err, "Job record refused terminal transition");
        } else if let Err(err) = jobs.update(record).await {
            warn!(job_id = %job.job_id, error = %err, "Could not persist terminal job status");
        }
    }
}
