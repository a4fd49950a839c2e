use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("File type '{extension}' is not supported")]
    UnsupportedType { extension: String },

    #[error("Extraction error: {message}")]
    Extraction { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Embedding error: {message}")]
    Embedding { message: String },

    #[error("Vector index error: {message}")]
    Index { message: String },

    #[error("Document not found or you do not have permission to access it")]
    NotFoundOrForbidden,

    #[error("Query error: {message}")]
    Query { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn unsupported_type(extension: impl Into<String>) -> Self {
        Self::UnsupportedType {
            extension: extension.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    pub fn index(message: impl Into<String>) -> Self {
        Self::Index {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }
}
