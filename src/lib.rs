//! Document Service
//!
//! An authenticated document ingestion and retrieval pipeline:
//! - Upload PDF, DOCX or plain-text files per authenticated user
//! - Background workers extract, chunk, embed and index the text
//! - Query a document's most relevant chunks with natural language

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use rand::Rng;
use tracing::info;

use api::state::AppState;
use domain::document::DocumentRepository;
use domain::embedding::EmbeddingProvider;
use infrastructure::auth::{JwtConfig, JwtService};
use infrastructure::document::{InMemoryDocumentRepository, PostgresDocumentRepository};
use infrastructure::index::InMemoryVectorIndex;
use infrastructure::jobs::{spawn_workers, InMemoryJobRepository, TokioJobQueue};
use infrastructure::services::{IngestionPipeline, QueryService, UploadService};
use infrastructure::storage::UploadStore;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration.
///
/// Wires the registry, queue, worker pool and services together and
/// starts the ingestion workers.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    // A bad chunking setup can never advance the ingestion window, so it
    // is rejected at startup rather than at job time.
    config.ingestion.chunking.validate()?;

    let documents = create_document_repository(config).await?;
    let jobs = Arc::new(InMemoryJobRepository::new());
    let index = Arc::new(InMemoryVectorIndex::new());
    let embeddings = create_embedding_provider(config)?;

    let (queue, receiver) = TokioJobQueue::channel();

    let pipeline = Arc::new(IngestionPipeline::new(
        documents.clone(),
        embeddings.clone(),
        index.clone(),
        config.ingestion.chunking,
    ));

    let worker_count = config.ingestion.workers.max(1);
    spawn_workers(worker_count, receiver, pipeline, jobs.clone());
    info!(workers = worker_count, "Ingestion worker pool started");

    let store = UploadStore::new(&config.storage.upload_dir)?;
    let upload_service = Arc::new(UploadService::new(
        store,
        documents.clone(),
        jobs,
        Arc::new(queue),
    ));

    let query_service = Arc::new(QueryService::new(
        documents.clone(),
        embeddings,
        index.clone(),
        config.query.top_k,
    ));

    let jwt_service = Arc::new(create_jwt_service(config));

    Ok(AppState::new(
        upload_service,
        query_service,
        jwt_service,
        documents,
        index,
    ))
}

async fn create_document_repository(
    config: &AppConfig,
) -> anyhow::Result<Arc<dyn DocumentRepository>> {
    match config.storage.backend.as_str() {
        "postgres" => {
            let database_url = std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

            info!("Connecting to PostgreSQL...");
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;

            let repository = PostgresDocumentRepository::new(pool);
            repository.ensure_schema().await?;
            info!("PostgreSQL document registry ready");

            Ok(Arc::new(repository))
        }
        "memory" => {
            info!("Using in-memory document registry");
            Ok(Arc::new(InMemoryDocumentRepository::new()))
        }
        other => Err(anyhow::anyhow!(
            "Unknown storage backend '{}'. Use 'memory' or 'postgres'.",
            other
        )),
    }
}

#[cfg(feature = "local-embeddings")]
fn create_embedding_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    use infrastructure::embedding::LocalEmbeddingProvider;

    let provider = LocalEmbeddingProvider::new(&config.embedding.model)?;
    info!(model = %config.embedding.model, "Using local embedding provider");
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "local-embeddings"))]
fn create_embedding_provider(_config: &AppConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    Err(anyhow::anyhow!(
        "Built without an embedding backend. Enable the 'local-embeddings' feature."
    ))
}

/// Create the JWT service from the configured secret, the JWT_SECRET
/// environment variable, or a random fallback.
fn create_jwt_service(config: &AppConfig) -> JwtService {
    let secret = config
        .auth
        .jwt_secret
        .clone()
        .or_else(|| std::env::var("JWT_SECRET").ok())
        .unwrap_or_else(|| {
            tracing::warn!(
                "No JWT secret configured. Generating a random secret; \
                tokens will NOT verify across restarts. \
                Set auth.jwt_secret or JWT_SECRET for stable verification."
            );
            generate_random_secret()
        });

    JwtService::new(JwtConfig::new(
        secret,
        u64::from(config.auth.jwt_expiration_hours),
    ))
}

/// Generate a random JWT secret
fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
