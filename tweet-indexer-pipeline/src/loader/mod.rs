//! Loader module for the tweet indexer pipeline.
//!
//! Builds bulk action/document line pairs and submits them to the
//! destination store in a single request.

use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use tweet_indexer_repository::{BatchOperationSummary, DocumentStore};
use tweet_indexer_shared::TweetDocument;

use crate::errors::PipelineError;

/// Outcome of one bulk submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadResult {
    /// `true` only if the store reported no item-level errors.
    pub success: bool,
    /// Documents submitted.
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl LoadResult {
    /// Result for a batch with nothing to submit.
    pub fn empty() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    fn from_summary(summary: &BatchOperationSummary, total: usize) -> Self {
        Self {
            success: !summary.has_errors(),
            total,
            succeeded: summary.succeeded,
            failed: summary.failed,
        }
    }
}

/// The action-metadata line for one document.
pub fn action_line(doc: &TweetDocument) -> Value {
    json!({ "index": { "_id": doc.document_id() } })
}

/// Build alternating action-metadata and document lines.
pub fn build_bulk_lines(docs: &[TweetDocument]) -> Result<Vec<Value>, PipelineError> {
    let mut lines = Vec::with_capacity(docs.len() * 2);
    for doc in docs {
        lines.push(action_line(doc));
        lines.push(serde_json::to_value(doc)?);
    }
    Ok(lines)
}

/// Index `docs` into `index` with one bulk request.
#[instrument(skip(store, index, docs), fields(index = %index, doc_count = docs.len()))]
pub async fn load_documents(
    store: &dyn DocumentStore,
    index: &str,
    docs: &[TweetDocument],
) -> Result<LoadResult, PipelineError> {
    if docs.is_empty() {
        debug!("No documents to load");
        return Ok(LoadResult::empty());
    }

    let lines = build_bulk_lines(docs)?;
    load_lines(store, index, lines).await
}

/// Submit pre-built bulk lines, e.g. read back from an output file.
#[instrument(skip(store, index, lines), fields(index = %index, line_count = lines.len()))]
pub async fn load_lines(
    store: &dyn DocumentStore,
    index: &str,
    lines: Vec<Value>,
) -> Result<LoadResult, PipelineError> {
    if lines.is_empty() {
        return Ok(LoadResult::empty());
    }
    if lines.len() % 2 != 0 {
        return Err(PipelineError::loader(format!(
            "bulk body has {} lines, expected action/document pairs",
            lines.len()
        )));
    }

    let total = lines.len() / 2;
    let summary = store.bulk(index, lines).await?;

    for failure in summary.failures() {
        warn!(
            document_id = %failure.document_id,
            error = failure.error.as_deref().unwrap_or("unknown"),
            "Document failed to index"
        );
    }

    let result = LoadResult::from_summary(&summary, total);
    if result.success {
        info!(count = total, "Indexed documents");
    } else {
        warn!(
            succeeded = result.succeeded,
            failed = result.failed,
            "Bulk request reported errors"
        );
    }

    Ok(result)
}
