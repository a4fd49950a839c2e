//! Query endpoint: retrieve relevant context from one document

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::document::DocumentId;

/// Question asked against a document
#[derive(Debug, Deserialize, Serialize)]
pub struct QueryRequest {
    pub question: String,
}

/// Retrieved context for a question
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub detail: String,
    pub relevant_context: String,
}

/// POST /v1/query/{document_id} - Answer a question against one document
pub async fn handle_query(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(document_id): Path<String>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    // A malformed id gets the same response as a missing or foreign one.
    let document_id =
        DocumentId::new(document_id).map_err(|_| ApiError::not_found_or_forbidden())?;

    let answer = state
        .query_service
        .answer(&document_id, &user.owner_id, &request.question)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(QueryResponse {
        detail: "Query successful.".to_string(),
        relevant_context: answer.context,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_deserialization() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"question": "what is chapter two about?"}"#).unwrap();
        assert_eq!(request.question, "what is chapter two about?");

        assert!(serde_json::from_str::<QueryRequest>(r#"{}"#).is_err());
    }

    #[test]
    fn test_query_response_serialization() {
        let response = QueryResponse {
            detail: "Query successful.".to_string(),
            relevant_context: "first chunk\n---\nsecond chunk".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("relevant_context"));
        assert!(json.contains("Query successful."));
    }
}
