//! PostgreSQL document repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::document::{Document, DocumentId, DocumentRepository, DocumentStatus};
use crate::domain::job::JobId;
use crate::domain::DomainError;

/// PostgreSQL implementation of DocumentRepository
#[derive(Debug, Clone)]
pub struct PostgresDocumentRepository {
    pool: PgPool,
}

impl PostgresDocumentRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the documents table and indexes if they do not exist.
    /// Called once on application startup.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                original_name TEXT NOT NULL,
                stored_name TEXT NOT NULL,
                status TEXT NOT NULL,
                job_id TEXT,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create documents table: {}", e)))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents (owner_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create owner index: {}", e)))?;

        Ok(())
    }
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document, DomainError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| DomainError::storage(e.to_string()))?;
    let owner_id: String = row
        .try_get("owner_id")
        .map_err(|e| DomainError::storage(e.to_string()))?;
    let original_name: String = row
        .try_get("original_name")
        .map_err(|e| DomainError::storage(e.to_string()))?;
    let stored_name: String = row
        .try_get("stored_name")
        .map_err(|e| DomainError::storage(e.to_string()))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| DomainError::storage(e.to_string()))?;
    let job_id: Option<String> = row
        .try_get("job_id")
        .map_err(|e| DomainError::storage(e.to_string()))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| DomainError::storage(e.to_string()))?;

    let job_id = job_id.map(JobId::new).transpose()?;

    Ok(Document::from_parts(
        DocumentId::new(id)?,
        owner_id,
        original_name,
        stored_name,
        DocumentStatus::parse(&status)?,
        job_id,
        created_at,
    ))
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn create(&self, document: Document) -> Result<Document, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, owner_id, original_name, stored_name, status, job_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(document.id().as_str())
        .bind(document.owner_id())
        .bind(document.original_name())
        .bind(document.stored_name())
        .bind(document.status().to_string())
        .bind(document.job_id().map(|j| j.as_str()))
        .bind(document.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!(
                    "Document '{}' already exists",
                    document.id().as_str()
                ))
            } else {
                DomainError::storage(format!("Failed to create document: {}", e))
            }
        })?;

        Ok(document)
    }

    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, original_name, stored_name, status, job_id, created_at
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get document: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_document(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_owned(
        &self,
        id: &DocumentId,
        owner_id: &str,
    ) -> Result<Option<Document>, DomainError> {
        // Both fields are filtered in the same statement; ownership is
        // never checked in application code after the fact.
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, original_name, stored_name, status, job_id, created_at
            FROM documents
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id.as_str())
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to look up document: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_document(&row)?)),
            None => Ok(None),
        }
    }

    async fn attach_job(&self, id: &DocumentId, job_id: &JobId) -> Result<(), DomainError> {
        // The job id is set only when none is present; the guard lives in
        // the statement so concurrent attaches cannot both win.
        let result = sqlx::query(
            "UPDATE documents SET job_id = $2 WHERE id = $1 AND job_id IS NULL",
        )
        .bind(id.as_str())
        .bind(job_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to attach job: {}", e)))?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        match self.get(id).await? {
            Some(doc) => Err(DomainError::conflict(format!(
                "Document '{}' already has job '{}' attached",
                id,
                doc.job_id().map(|j| j.as_str()).unwrap_or("<unknown>")
            ))),
            None => Err(DomainError::not_found(format!("Document '{}'", id))),
        }
    }

    async fn set_status(
        &self,
        id: &DocumentId,
        status: DocumentStatus,
    ) -> Result<(), DomainError> {
        if !status.is_terminal() {
            return Err(DomainError::conflict(format!(
                "Document '{}' cannot be moved back to {}",
                id, status
            )));
        }

        // Monotonicity is enforced in the statement: a terminal status can
        // be written over PENDING, or idempotently over itself.
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET status = $2
            WHERE id = $1 AND (status = 'PENDING' OR status = $2)
            "#,
        )
        .bind(id.as_str())
        .bind(status.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to set status: {}", e)))?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        match self.get(id).await? {
            Some(doc) => Err(DomainError::conflict(format!(
                "Document '{}' cannot transition from {} to {}",
                id,
                doc.status(),
                status
            ))),
            None => Err(DomainError::not_found(format!("Document '{}'", id))),
        }
    }
}
