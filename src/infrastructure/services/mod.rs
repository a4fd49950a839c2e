//! Application services: upload, ingestion pipeline, and query

mod ingestion;
mod query;
mod upload;

pub use ingestion::{IngestionOutcome, IngestionPipeline};
pub use query::{QueryAnswer, QueryService};
pub use upload::{UploadReceipt, UploadService};
