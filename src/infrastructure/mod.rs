//! Infrastructure layer: concrete implementations of the domain's
//! capability interfaces

pub mod auth;
pub mod document;
pub mod embedding;
pub mod index;
pub mod ingestion;
pub mod jobs;
pub mod logging;
pub mod services;
pub mod storage;
