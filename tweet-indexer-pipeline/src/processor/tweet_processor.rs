//! Tweet processor implementation.
//!
//! Transforms a fetched batch into documents ready for loading.

use tracing::{debug, instrument, warn};

use tweet_indexer_shared::{RawRecord, TweetDocument};

use crate::processor::transformer::{TransformError, TweetTransformer};

/// Result of processing a batch.
#[derive(Debug, Default)]
pub struct ProcessedBatch {
    /// Normalized documents, in fetch order (newest first).
    pub documents: Vec<TweetDocument>,
    /// Number of records the transformer rejected.
    pub rejected: usize,
}

/// Processor that transforms raw records into tweet documents.
///
/// A rejected record is logged and skipped; it never aborts the rest of the
/// batch.
pub struct TweetProcessor {}

impl TweetProcessor {
    /// Create a new tweet processor.
    pub fn new() -> Self {
        Self {}
    }

    /// Process a batch of raw records.
    #[instrument(skip(self, records), fields(record_count = records.len()))]
    pub fn process_batch(&self, records: &[RawRecord]) -> ProcessedBatch {
        let mut processed = ProcessedBatch {
            documents: Vec::with_capacity(records.len()),
            rejected: 0,
        };

        for record in records {
            match transform_record(record) {
                Ok(doc) => processed.documents.push(doc),
                Err(e) => {
                    warn!(id = ?record.id(), error = %e, "Skipping record");
                    processed.rejected += 1;
                }
            }
        }

        debug!(
            processed_count = processed.documents.len(),
            rejected = processed.rejected,
            "Processed record batch"
        );
        processed
    }
}

fn transform_record(record: &RawRecord) -> Result<TweetDocument, TransformError> {
    let mut transformer = TweetTransformer::new();
    transformer.populate(record)?;
    transformer.into_document()
}

impl Default for TweetProcessor {
    fn default() -> Self {
        Self::new()
    }
}
