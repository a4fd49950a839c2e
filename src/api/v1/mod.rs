//! v1 API endpoints

pub mod documents;
pub mod query;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create the v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/documents/upload", post(documents::upload_document))
        .route("/documents/{document_id}", get(documents::get_document))
        .route("/query/{document_id}", post(query::handle_query))
}
