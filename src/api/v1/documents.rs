//! Document endpoints: upload and status polling

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::document::{Document, DocumentId, DocumentStatus};
use crate::domain::job::JobId;

/// Response to a successful upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub detail: String,
    pub document_id: DocumentId,
    pub job_id: JobId,
}

/// Response to a status poll
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentStatusResponse {
    pub document_id: DocumentId,
    pub status: DocumentStatus,
    pub original_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Document> for DocumentStatusResponse {
    fn from(document: Document) -> Self {
        Self {
            document_id: document.id().clone(),
            status: document.status(),
            original_name: document.original_name().to_string(),
            created_at: document.created_at(),
        }
    }
}

/// POST /v1/documents/upload - Accept a file and queue it for ingestion
pub async fn upload_document(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let (original_name, bytes) = read_file_field(&mut multipart).await?;

    let receipt = state
        .upload_service
        .upload(&user.owner_id, &original_name, &bytes)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UploadResponse {
        detail: "File accepted and is being processed.".to_string(),
        document_id: receipt.document_id,
        job_id: receipt.job_id,
    }))
}

/// GET /v1/documents/{document_id} - Poll a document's ingestion status
pub async fn get_document(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentStatusResponse>, ApiError> {
    // A malformed id gets the same response as a missing or foreign one.
    let document_id =
        DocumentId::new(document_id).map_err(|_| ApiError::not_found_or_forbidden())?;

    let document = state
        .query_service
        .find_owned(&document_id, &user.owner_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(DocumentStatusResponse::from(document)))
}

/// Pull the `file` field out of the multipart body
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field
            .file_name()
            .map(|name| name.to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::bad_request("File field is missing a filename"))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Could not read file field: {}", e)))?;

        return Ok((original_name, bytes.to_vec()));
    }

    Err(ApiError::bad_request(
        "Multipart body must contain a 'file' field",
    ))
}
