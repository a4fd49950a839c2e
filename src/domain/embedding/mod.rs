//! Embedding provider trait and the asymmetric role convention

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Role a text plays in the asymmetric embedding scheme.
///
/// Stored passages and search questions are encoded differently: every
/// input is prefixed with its role marker before reaching the model. The
/// model was trained with these exact markers, so retrieval quality
/// depends on preserving them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingRole {
    /// Document chunk being stored for later retrieval
    Passage,
    /// Search question being matched against stored passages
    Query,
}

impl EmbeddingRole {
    /// The marker prepended to every input before encoding
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Passage => "passage: ",
            Self::Query => "query: ",
        }
    }

    /// Apply the marker to a single text
    pub fn apply(&self, text: &str) -> String {
        format!("{}{}", self.prefix(), text)
    }
}

/// Trait for embedding providers.
///
/// `embed` returns one vector per input, in input order. Implementations
/// must return an empty output for an empty input without invoking the
/// model at all.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Encode a batch of texts under the given role
    async fn embed(
        &self,
        texts: &[String],
        role: EmbeddingRole,
    ) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Embedding vector dimensionality
    fn dimensions(&self) -> usize;
}
