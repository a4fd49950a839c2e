//! Ingestion infrastructure: file-format text extraction

mod extract;

pub use extract::extract_text;
