//! Application state for shared services

use std::sync::Arc;

use crate::domain::document::DocumentRepository;
use crate::domain::index::VectorIndex;
use crate::infrastructure::auth::JwtVerifier;
use crate::infrastructure::services::{QueryService, UploadService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub upload_service: Arc<UploadService>,
    pub query_service: Arc<QueryService>,
    pub jwt_service: Arc<dyn JwtVerifier>,
    pub documents: Arc<dyn DocumentRepository>,
    pub index: Arc<dyn VectorIndex>,
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(
        upload_service: Arc<UploadService>,
        query_service: Arc<QueryService>,
        jwt_service: Arc<dyn JwtVerifier>,
        documents: Arc<dyn DocumentRepository>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            upload_service,
            query_service,
            jwt_service,
            documents,
            index,
        }
    }
}
