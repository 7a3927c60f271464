//! Document store trait definition.
//!
//! This module defines the abstract interface the pipeline needs from the
//! destination store, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, in-memory mocks).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;

/// Abstracts the destination search index.
///
/// The index name is passed to every operation rather than held by the
/// implementation, so one store handle can serve several indices and every
/// pipeline stage states explicitly where it writes.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a single handle can be
/// shared by concurrent list-mode workers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ensure the index exists, creating it with the tweet mappings if not.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the index
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index exists or was created
    /// * `Err(SearchIndexError)` - If the check or creation fails
    async fn ensure_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Submit one bulk request made of newline-delimited action/document pairs.
    ///
    /// # Arguments
    ///
    /// * `index` - Default index for actions that do not name one
    /// * `lines` - Alternating action-metadata and document lines
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - The aggregate error flag and per-item outcomes
    /// * `Err(SearchIndexError)` - If the request as a whole failed
    async fn bulk(
        &self,
        index: &str,
        lines: Vec<Value>,
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Identifier of the document with the most recent `@timestamp`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(id))` - The `_id` of the newest document
    /// * `Ok(None)` - If the index is empty or does not exist
    /// * `Err(SearchIndexError)` - If the query fails
    async fn most_recent_document_id(&self, index: &str)
        -> Result<Option<String>, SearchIndexError>;

    /// Check if the store is healthy and reachable.
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
