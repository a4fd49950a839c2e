//! CLI module for the Document Service
//!
//! Provides the `serve` subcommand, which runs the HTTP API together with
//! the in-process ingestion worker pool.

pub mod serve;

use clap::{Parser, Subcommand};

/// Document Service - authenticated document ingestion and retrieval
#[derive(Parser)]
#[command(name = "document-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server and ingestion workers
    Serve,
}
