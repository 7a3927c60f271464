//! Error types for the tweet indexer pipeline.

use thiserror::Error;
use tweet_indexer_repository::SearchIndexError;

use crate::processor::TransformError;
use crate::source::SourceError;

/// Errors that can occur in the tweet indexer pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Hard failure reported by the remote source.
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// Error from the document store.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// A document could not be produced or serialized.
    #[error("Transform error: {0}")]
    TransformError(#[from] TransformError),

    /// Error from the loader component.
    #[error("Loader error: {0}")]
    LoaderError(String),

    /// The watermark could not be read or written.
    #[error("Checkpoint error: {0}")]
    CheckpointError(String),

    /// Invalid run parameters.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error parsing a local input file.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// JSON serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Filesystem error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a loader error.
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::LoaderError(msg.into())
    }

    /// Create a checkpoint error.
    pub fn checkpoint(msg: impl Into<String>) -> Self {
        Self::CheckpointError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
