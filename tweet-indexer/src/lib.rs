//! # Tweet Indexer
//!
//! Main library for the incremental tweet indexer.
//!
//! This crate provides the command line, configuration and logging setup
//! for running the tweet indexer pipeline.

pub mod cli;
pub mod config;
pub mod logging;

pub use config::Settings;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] tweet_indexer_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] tweet_indexer_repository::SearchIndexError),

    /// Tweet source error.
    #[error("Source error: {0}")]
    SourceError(#[from] tweet_indexer_pipeline::source::SourceError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
