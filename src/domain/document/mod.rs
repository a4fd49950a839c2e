//! Document lifecycle domain: entities and the registry trait

mod entity;
mod repository;

pub use entity::{Document, DocumentId, DocumentStatus};
pub use repository::DocumentRepository;

#[cfg(test)]
pub use repository::tests as repository_tests;
