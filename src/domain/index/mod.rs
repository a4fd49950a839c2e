//! Vector index capability interface

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A chunk as stored in (and returned by) the vector index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Deterministic chunk id: `{stored_name}_{index}`
    pub id: String,
    /// Document this chunk belongs to (filter metadata)
    pub document_id: String,
    /// Position of the chunk within its document
    pub chunk_index: usize,
    /// Chunk text
    pub text: String,
}

/// A chunk returned from a similarity query, with its score
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: ChunkRecord,
    /// Similarity to the query vector; higher is more similar
    pub score: f32,
}

/// Capability interface over the external similarity-search engine.
///
/// The index owns chunks after upsert; nothing else in the system holds a
/// long-term reference to them.
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Store a document's chunks and their vectors.
    ///
    /// `chunks` and `vectors` must have the same length. Each chunk gets
    /// the deterministic id `{stored_name}_{index}`, so a retried upsert
    /// with identical inputs overwrites in place instead of duplicating
    /// entries. Empty input is a no-op. Returns the number of chunks
    /// stored.
    async fn upsert(
        &self,
        document_id: &str,
        stored_name: &str,
        chunks: &[String],
        vectors: &[Vec<f32>],
    ) -> Result<usize, DomainError>;

    /// Return up to `top_k` chunks whose metadata matches `document_id`,
    /// ranked by similarity (highest first, ties broken by insertion
    /// order). Zero matches is an empty result, never an error.
    async fn query(
        &self,
        vector: &[f32],
        document_id: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, DomainError>;
}
