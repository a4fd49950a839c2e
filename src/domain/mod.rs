//! Domain layer: entities, status machines, capability traits, and the
//! error taxonomy

pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod ingestion;
pub mod job;

pub use document::{Document, DocumentId, DocumentStatus};
pub use error::DomainError;
