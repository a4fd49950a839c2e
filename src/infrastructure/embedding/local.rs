//! Local embedding provider backed by fastembed
//!
//! The model is expensive to load, so each process holds at most one
//! instance: a `OnceCell` guards initialization, every caller after the
//! first reuses the loaded handle. fastembed's `embed` needs `&mut self`,
//! so inference goes through a mutex; encoding itself runs on the
//! blocking pool.

use std::fmt::Debug;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::{Mutex, OnceCell};
use tracing::info;

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRole};
use crate::domain::DomainError;

/// Embedding provider running a local model in the worker process
pub struct LocalEmbeddingProvider {
    model_name: String,
    dimensions: usize,
    model: OnceCell<Mutex<TextEmbedding>>,
}

impl Debug for LocalEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEmbeddingProvider")
            .field("model_name", &self.model_name)
            .field("dimensions", &self.dimensions)
            .field("loaded", &self.model.initialized())
            .finish()
    }
}

impl LocalEmbeddingProvider {
    /// Create a provider. The model is not loaded until the first embed.
    pub fn new(model_name: impl Into<String>) -> Result<Self, DomainError> {
        let model_name = model_name.into();
        let (_, dimensions) = resolve_model(&model_name)?;
        Ok(Self {
            model_name,
            dimensions,
            model: OnceCell::new(),
        })
    }

    async fn model(&self) -> Result<&Mutex<TextEmbedding>, DomainError> {
        let model_name = self.model_name.clone();
        self.model
            .get_or_try_init(|| async move {
                let (model, _) = resolve_model(&model_name)?;
                info!(model = %model_name, "Loading local embedding model");

                let loaded = tokio::task::spawn_blocking(move || {
                    TextEmbedding::try_new(
                        InitOptions::new(model).with_show_download_progress(false),
                    )
                })
                .await
                .map_err(|e| DomainError::embedding(format!("Model load task failed: {}", e)))?
                .map_err(|e| {
                    DomainError::embedding(format!("Failed to load embedding model: {}", e))
                })?;

                info!(model = %model_name, "Local embedding model loaded");
                Ok(Mutex::new(loaded))
            })
            .await
    }
}

/// Map a configured model name onto a fastembed model and its dimensions
fn resolve_model(name: &str) -> Result<(EmbeddingModel, usize), DomainError> {
    match name {
        "multilingual-e5-base" => Ok((EmbeddingModel::MultilingualE5Base, 768)),
        "multilingual-e5-small" => Ok((EmbeddingModel::MultilingualE5Small, 384)),
        "all-minilm-l6-v2" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
        other => Err(DomainError::configuration(format!(
            "Unknown embedding model '{}'",
            other
        ))),
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    async fn embed(
        &self,
        texts: &[String],
        role: EmbeddingRole,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prefixed: Vec<String> = texts.iter().map(|text| role.apply(text)).collect();

        let model = self.model().await?;
        let mut guard = model.lock().await;
        let vectors = tokio::task::block_in_place(|| guard.embed(prefixed, None))
            .map_err(|e| DomainError::embedding(format!("Embedding failed: {}", e)))?;

        if vectors.len() != texts.len() {
            return Err(DomainError::embedding(format!(
                "Model returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }

        Ok(vectors)
    }

    fn provider_name(&self) -> &'static str {
        "local"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
