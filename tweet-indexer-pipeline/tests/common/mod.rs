//! Shared fakes for the pipeline integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use tweet_indexer_pipeline::source::{PageOutcome, PageRequest, SourceError, TweetSource};
use tweet_indexer_repository::{BatchOperationResult, BatchOperationSummary, DocumentStore, SearchIndexError};
use tweet_indexer_shared::RawRecord;

/// A raw tweet that passes the transformer.
pub fn tweet(id: u64) -> RawRecord {
    RawRecord::new(json!({
        "id": id,
        "id_str": id.to_string(),
        "created_at": "Mon Oct 12 09:30:00 +0000 2020",
        "full_text": format!("#Rust tweet number {}", id),
        "source": "<a href=\"https://mobile.twitter.com\" rel=\"nofollow\">Twitter Web App</a>",
        "user": {
            "id_str": "42",
            "name": "Ferris",
            "screen_name": "ferris",
            "followers_count": 10,
            "created_at": "Tue Mar 10 06:53:11 +0000 2009"
        },
        "is_quote_status": false,
        "entities": {"hashtags": [{"text": "Rust", "indices": [0, 5]}], "urls": []}
    }))
}

/// Search timeline holding ids `1..=newest`, served newest-first and
/// honouring `max_id`, `since_id` and `count`.
pub struct GrowingTimeline {
    newest: AtomicU64,
    pub calls: AtomicU32,
}

impl GrowingTimeline {
    pub fn new(newest: u64) -> Self {
        Self {
            newest: AtomicU64::new(newest),
            calls: AtomicU32::new(0),
        }
    }

    /// Publish tweets up to `newest`.
    pub fn grow_to(&self, newest: u64) {
        self.newest.store(newest, Ordering::SeqCst);
    }
}

#[async_trait]
impl TweetSource for GrowingTimeline {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<PageOutcome, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let newest = self.newest.load(Ordering::SeqCst);
        let top = request.max_id.map_or(newest, |max| max.min(newest));
        let floor = request.since_id.map_or(1, |since| since + 1);

        let records = (floor..=top)
            .rev()
            .take(request.count as usize)
            .map(tweet)
            .collect();
        Ok(PageOutcome::Records(records))
    }
}

/// In-memory index keyed by `_id`.
#[derive(Default)]
pub struct MemoryStore {
    pub documents: Mutex<Vec<(String, Value)>>,
}

impl MemoryStore {
    pub fn ids(&self) -> Vec<String> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_index(&self, _index: &str) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn bulk(&self, _index: &str, lines: Vec<Value>) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut documents = self.documents.lock().unwrap();
        let mut results = Vec::new();

        for pair in lines.chunks(2) {
            let id = pair[0]["index"]["_id"].as_str().unwrap_or_default().to_string();
            documents.retain(|(existing, _)| existing != &id);
            documents.push((id.clone(), pair[1].clone()));
            results.push(BatchOperationResult {
                document_id: id,
                success: true,
                error: None,
            });
        }

        Ok(BatchOperationSummary::from_results(results, false))
    }

    async fn most_recent_document_id(&self, _index: &str) -> Result<Option<String>, SearchIndexError> {
        // Every fake tweet shares a timestamp, so the numerically largest id stands in
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(id, _)| id.parse::<u64>().ok())
            .max()
            .map(|id| id.to_string()))
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        Ok(true)
    }
}
