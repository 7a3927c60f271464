//! Checkpoint module for the tweet indexer pipeline.
//!
//! Resolves the watermark, the newest identifier already durably stored,
//! either from the destination index itself or from a local file.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use tweet_indexer_repository::DocumentStore;
use tweet_indexer_shared::Watermark;

use crate::errors::PipelineError;

/// Source of the watermark for an incremental run.
#[async_trait]
pub trait CheckpointResolver: Send + Sync {
    /// The newest identifier already stored, or [`Watermark::None`].
    async fn watermark(&self) -> Result<Watermark, PipelineError>;
}

/// Watermark read from the most recently timestamped document in an index.
pub struct StoreCheckpoint<'a> {
    store: &'a dyn DocumentStore,
    index: &'a str,
}

impl<'a> StoreCheckpoint<'a> {
    pub fn new(store: &'a dyn DocumentStore, index: &'a str) -> Self {
        Self { store, index }
    }
}

#[async_trait]
impl<'a> CheckpointResolver for StoreCheckpoint<'a> {
    #[instrument(skip(self), fields(index = %self.index))]
    async fn watermark(&self) -> Result<Watermark, PipelineError> {
        let Some(id) = self.store.most_recent_document_id(self.index).await? else {
            debug!("Index holds no documents");
            return Ok(Watermark::None);
        };

        let watermark = Watermark::parse(&id).map_err(|e| {
            PipelineError::checkpoint(format!("document id `{}` is not numeric: {}", id, e))
        })?;

        info!(watermark = %watermark, "Resolved watermark from index");
        Ok(watermark)
    }
}

/// Watermark kept in a local file as a single decimal line.
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
}

impl FileCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `id` as the new watermark, replacing the previous one.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn advance(&self, id: u64) -> Result<(), PipelineError> {
        tokio::fs::write(&self.path, format!("{}\n", id))
            .await
            .map_err(|e| PipelineError::checkpoint(format!("cannot write {}: {}", self.path.display(), e)))?;

        info!(watermark = id, "Advanced checkpoint");
        Ok(())
    }
}

#[async_trait]
impl CheckpointResolver for FileCheckpoint {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn watermark(&self) -> Result<Watermark, PipelineError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No checkpoint file yet");
                return Ok(Watermark::None);
            }
            Err(e) => return Err(e.into()),
        };

        let watermark = Watermark::parse(&contents).map_err(|e| {
            PipelineError::checkpoint(format!(
                "{} does not hold a numeric identifier: {}",
                self.path.display(),
                e
            ))
        })?;

        info!(watermark = %watermark, "Resolved watermark from file");
        Ok(watermark)
    }
}
