mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, EmbeddingConfig, IngestionConfig, LogFormat, LoggingConfig,
    QueryConfig, ServerConfig, StorageConfig,
};
