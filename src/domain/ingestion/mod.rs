//! Ingestion domain: chunking configuration and the chunker

mod chunker;

pub use chunker::{chunk_text, ChunkingConfig};
