//! In-memory vector index for development and testing

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::index::{ChunkRecord, ScoredChunk, VectorIndex};
use crate::domain::DomainError;

/// In-memory vector index with cosine-similarity search and a
/// document-id metadata filter.
///
/// Entries are keyed by the deterministic chunk id, so a retried upsert
/// overwrites in place and keeps the entry's original insertion rank,
/// which keeps ranking ties stable across redeliveries.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    inner: Arc<RwLock<IndexState>>,
}

#[derive(Debug, Default)]
struct IndexState {
    /// chunk id -> position in `entries`
    by_id: HashMap<String, usize>,
    entries: Vec<StoredEntry>,
}

#[derive(Debug, Clone)]
struct StoredEntry {
    record: ChunkRecord,
    vector: Vec<f32>,
    /// Insertion rank, used as the stable tie-breaker
    seq: usize,
}

impl InMemoryVectorIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored chunks (for readiness checks and tests)
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Cosine similarity between two vectors of equal length
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(
        &self,
        document_id: &str,
        stored_name: &str,
        chunks: &[String],
        vectors: &[Vec<f32>],
    ) -> Result<usize, DomainError> {
        if chunks.len() != vectors.len() {
            return Err(DomainError::index(format!(
                "chunk/vector count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }
        if chunks.is_empty() {
            return Ok(0);
        }

        let mut state = self.inner.write().await;
        for (i, (text, vector)) in chunks.iter().zip(vectors.iter()).enumerate() {
            let id = format!("{}_{}", stored_name, i);
            let record = ChunkRecord {
                id: id.clone(),
                document_id: document_id.to_string(),
                chunk_index: i,
                text: text.clone(),
            };

            match state.by_id.get(&id).copied() {
                Some(pos) => {
                    // Overwrite in place; insertion rank is preserved.
                    let seq = state.entries[pos].seq;
                    state.entries[pos] = StoredEntry {
                        record,
                        vector: vector.clone(),
                        seq,
                    };
                }
                None => {
                    let seq = state.entries.len();
                    state.entries.push(StoredEntry {
                        record,
                        vector: vector.clone(),
                        seq,
                    });
                    state.by_id.insert(id, seq);
                }
            }
        }

        Ok(chunks.len())
    }

    async fn query(
        &self,
        vector: &[f32],
        document_id: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, DomainError> {
        let state = self.inner.read().await;

        let mut scored: Vec<(f32, usize, &StoredEntry)> = state
            .entries
            .iter()
            .filter(|entry| entry.record.document_id == document_id)
            .map(|entry| (cosine_similarity(vector, &entry.vector), entry.seq, entry))
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, _, entry)| ScoredChunk {
                chunk: entry.record.clone(),
                score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_of(components: &[f32]) -> Vec<f32> {
        components.to_vec()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_upsert_and_query_ranking() {
        let index = InMemoryVectorIndex::new();
        let chunks = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let vectors = vec![
            vec_of(&[1.0, 0.0]),
            vec_of(&[0.0, 1.0]),
            vec_of(&[0.7, 0.7]),
        ];

        let stored = index.upsert("doc-1", "f.txt", &chunks, &vectors).await.unwrap();
        assert_eq!(stored, 3);

        let results = index.query(&[1.0, 0.0], "doc-1", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "a");
        assert_eq!(results[1].chunk.text, "c");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let index = InMemoryVectorIndex::new();
        let chunks = vec!["a".to_string(), "b".to_string()];
        let vectors = vec![vec_of(&[1.0, 0.0]), vec_of(&[0.0, 1.0])];

        index.upsert("doc-1", "f.txt", &chunks, &vectors).await.unwrap();
        // Redelivered job repeats the identical upsert.
        index.upsert("doc-1", "f.txt", &chunks, &vectors).await.unwrap();

        assert_eq!(index.len().await, 2);

        // A generous top_k must not surface duplicated hits.
        let results = index.query(&[1.0, 0.0], "doc-1", 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "f.txt_0");
        assert_eq!(results[1].chunk.id, "f.txt_1");
    }

    #[tokio::test]
    async fn test_filter_restricts_candidates_before_ranking() {
        let index = InMemoryVectorIndex::new();

        // Document B's chunk is a perfect match for the query vector, but
        // it must never appear in a document-A query.
        index
            .upsert("doc-a", "a.txt", &["alpha".to_string()], &[vec_of(&[0.1, 0.9])])
            .await
            .unwrap();
        index
            .upsert("doc-b", "b.txt", &["beta".to_string()], &[vec_of(&[1.0, 0.0])])
            .await
            .unwrap();

        let results = index.query(&[1.0, 0.0], "doc-a", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.document_id, "doc-a");
        assert_eq!(results[0].chunk.text, "alpha");
    }

    #[tokio::test]
    async fn test_zero_matches_is_empty_not_error() {
        let index = InMemoryVectorIndex::new();
        let results = index.query(&[1.0, 0.0], "doc-missing", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_upsert_is_noop() {
        let index = InMemoryVectorIndex::new();
        let stored = index.upsert("doc-1", "f.txt", &[], &[]).await.unwrap();
        assert_eq!(stored, 0);
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn test_length_mismatch_is_error() {
        let index = InMemoryVectorIndex::new();
        let err = index
            .upsert("doc-1", "f.txt", &["a".to_string()], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Index { .. }));
    }

    #[tokio::test]
    async fn test_ties_break_by_insertion_order() {
        let index = InMemoryVectorIndex::new();
        let chunks = vec!["first".to_string(), "second".to_string()];
        // Identical vectors: scores tie exactly.
        let vectors = vec![vec_of(&[1.0, 1.0]), vec_of(&[1.0, 1.0])];
        index.upsert("doc-1", "f.txt", &chunks, &vectors).await.unwrap();

        let results = index.query(&[1.0, 1.0], "doc-1", 2).await.unwrap();
        assert_eq!(results[0].chunk.text, "first");
        assert_eq!(results[1].chunk.text, "second");
    }
}
