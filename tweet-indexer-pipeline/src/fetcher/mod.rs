//! Fetcher module for the tweet indexer pipeline.
//!
//! Walks the source backward in time, one page at a time, until the history
//! newer than the watermark is exhausted, the remote rate-limits us, or the
//! request cap is reached.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use tweet_indexer_shared::{RawRecord, Watermark};

use crate::errors::PipelineError;
use crate::source::{PageOutcome, PageRequest, QuerySelector, TweetSource};

/// Maximum page requests per run; matches the remote's rate-limit window.
pub const MAX_PAGE_REQUESTS: u32 = 80;

/// Configuration for the fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Hard cap on page requests for a paginated run.
    pub max_requests: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_requests: MAX_PAGE_REQUESTS,
        }
    }
}

/// Why a pagination run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source returned an empty page.
    Exhausted,
    /// The page reached back to the watermark.
    ReachedWatermark,
    /// The source signalled a rate limit.
    RateLimited,
    /// The request cap was used up.
    RequestCap,
}

/// Records accumulated by one pagination run, newest-first.
///
/// Never holds a record whose identifier is at or below the watermark the
/// run was started with.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub records: Vec<RawRecord>,
    /// Page requests issued, including the one that ended the run.
    pub requests: u32,
    pub stop_reason: StopReason,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identifier of the newest record, i.e. the first one.
    pub fn newest_id(&self) -> Option<u64> {
        self.records.first().and_then(RawRecord::id)
    }
}

/// Fetcher that drives paginated calls against a tweet source.
pub struct TweetFetcher {
    source: Arc<dyn TweetSource>,
    config: FetcherConfig,
}

impl TweetFetcher {
    /// Create a new fetcher with the default request cap.
    pub fn new(source: Arc<dyn TweetSource>) -> Self {
        Self {
            source,
            config: FetcherConfig::default(),
        }
    }

    /// Create a new fetcher with custom configuration.
    pub fn with_config(source: Arc<dyn TweetSource>, config: FetcherConfig) -> Self {
        Self { source, config }
    }

    /// Fetch everything newer than `watermark`, up to the configured cap.
    pub async fn fetch(
        &self,
        selector: &QuerySelector,
        watermark: Watermark,
    ) -> Result<Batch, PipelineError> {
        self.fetch_pages(selector, watermark, self.config.max_requests)
            .await
    }

    /// Fetch the single most recent page, ignoring any watermark.
    pub async fn fetch_latest(&self, selector: &QuerySelector) -> Result<Batch, PipelineError> {
        self.fetch_pages(selector, Watermark::None, 1).await
    }

    /// Page backward from the newest record.
    ///
    /// Rate limiting and exhaustion end the run normally with whatever was
    /// accumulated; only hard source errors are returned as `Err`.
    #[instrument(skip(self, selector, watermark), fields(selector = %selector, watermark = %watermark))]
    pub async fn fetch_pages(
        &self,
        selector: &QuerySelector,
        watermark: Watermark,
        max_requests: u32,
    ) -> Result<Batch, PipelineError> {
        let mut records: Vec<RawRecord> = Vec::new();
        let mut before_id: Option<u64> = None;
        let mut requests = 0;
        let mut stop_reason = StopReason::RequestCap;

        while requests < max_requests {
            let request = PageRequest {
                selector,
                count: selector.page_size(),
                max_id: before_id,
                since_id: watermark.since_id(),
            };

            requests += 1;
            let page = match self.source.fetch_page(&request).await? {
                PageOutcome::RateLimited => {
                    warn!(requests = requests, "Rate limit reached, stopping pagination");
                    stop_reason = StopReason::RateLimited;
                    break;
                }
                PageOutcome::Records(page) => page,
            };

            if page.is_empty() {
                debug!(requests = requests, "Search has been exhausted");
                stop_reason = StopReason::Exhausted;
                break;
            }

            let Some(oldest) = page.iter().filter_map(RawRecord::id).min() else {
                warn!(count = page.len(), "Page has no record identifiers, stopping pagination");
                stop_reason = StopReason::Exhausted;
                break;
            };

            let received = page.len();
            let admitted: Vec<RawRecord> = page
                .into_iter()
                .filter(|record| match record.id() {
                    Some(id) => watermark.admits(id) && before_id.map_or(true, |b| id <= b),
                    None => {
                        warn!("Dropping record without identifier");
                        false
                    }
                })
                .collect();

            if admitted.len() < received {
                debug!(
                    received = received,
                    admitted = admitted.len(),
                    "Dropped records outside the requested window"
                );
            }

            let admitted_any = !admitted.is_empty();
            records.extend(admitted);

            if !admitted_any || !watermark.admits(oldest) {
                stop_reason = StopReason::ReachedWatermark;
                break;
            }

            match oldest.checked_sub(1) {
                Some(next) => before_id = Some(next),
                None => {
                    stop_reason = StopReason::Exhausted;
                    break;
                }
            }
        }

        info!(
            fetched = records.len(),
            requests = requests,
            stop_reason = ?stop_reason,
            "Pagination finished"
        );

        Ok(Batch {
            records,
            requests,
            stop_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Mock source serving a fixed id range newest-first, honouring max_id/since_id.
    struct RangeSource {
        newest: u64,
        oldest: u64,
        rate_limit_after: Option<u32>,
        calls: AtomicU32,
        seen: Mutex<Vec<(Option<u64>, Option<u64>)>>,
    }

    impl RangeSource {
        fn new(newest: u64, oldest: u64) -> Self {
            Self {
                newest,
                oldest,
                rate_limit_after: None,
                calls: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TweetSource for RangeSource {
        async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<PageOutcome, SourceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((request.max_id, request.since_id));

            if let Some(limit) = self.rate_limit_after {
                if call >= limit {
                    return Ok(PageOutcome::RateLimited);
                }
            }

            let top = request.max_id.unwrap_or(self.newest).min(self.newest);
            let floor = request.since_id.map_or(self.oldest, |s| (s + 1).max(self.oldest));
            let records = (floor..=top)
                .rev()
                .take(request.count as usize)
                .map(|id| RawRecord::new(json!({ "id": id })))
                .collect();
            Ok(PageOutcome::Records(records))
        }
    }

    /// Mock source that ignores every bound and always returns the same page.
    struct StubbornSource;

    #[async_trait]
    impl TweetSource for StubbornSource {
        async fn fetch_page(&self, _request: &PageRequest<'_>) -> Result<PageOutcome, SourceError> {
            Ok(PageOutcome::Records(
                (1..=5).rev().map(|id| RawRecord::new(json!({ "id": id }))).collect(),
            ))
        }
    }

    fn ids(batch: &Batch) -> Vec<u64> {
        batch.records.iter().filter_map(RawRecord::id).collect()
    }

    #[tokio::test]
    async fn test_pages_until_exhausted() {
        let source = Arc::new(RangeSource::new(250, 1));
        let fetcher = TweetFetcher::new(source.clone());
        let selector = QuerySelector::SearchTerm("rust".to_string());

        let batch = fetcher.fetch(&selector, Watermark::None).await.unwrap();

        assert_eq!(batch.len(), 250);
        assert_eq!(batch.newest_id(), Some(250));
        assert_eq!(batch.stop_reason, StopReason::Exhausted);
        // 100 + 100 + 50 + one empty page
        assert_eq!(batch.requests, 4);

        let seen = source.seen.lock().unwrap().clone();
        assert_eq!(seen[0], (None, None));
        assert_eq!(seen[1], (Some(150), None));
        assert_eq!(seen[2], (Some(50), None));
    }

    #[tokio::test]
    async fn test_respects_watermark() {
        let source = Arc::new(RangeSource::new(500, 1));
        let fetcher = TweetFetcher::new(source.clone());
        let selector = QuerySelector::SearchTerm("rust".to_string());

        let batch = fetcher.fetch(&selector, Watermark::Id(420)).await.unwrap();

        assert_eq!(batch.len(), 80);
        assert!(ids(&batch).iter().all(|id| *id > 420));
        assert_eq!(source.seen.lock().unwrap()[0].1, Some(420));
    }

    #[tokio::test]
    async fn test_stops_within_request_cap() {
        let source = Arc::new(RangeSource::new(1_000_000, 1));
        let fetcher = TweetFetcher::new(source.clone());
        let selector = QuerySelector::SearchTerm("busy".to_string());

        let batch = fetcher.fetch(&selector, Watermark::None).await.unwrap();

        assert_eq!(batch.requests, MAX_PAGE_REQUESTS);
        assert_eq!(source.calls.load(Ordering::SeqCst), MAX_PAGE_REQUESTS);
        assert_eq!(batch.stop_reason, StopReason::RequestCap);
        assert_eq!(batch.len(), 80 * 100);
    }

    #[tokio::test]
    async fn test_rate_limit_keeps_accumulated_pages() {
        let mut source = RangeSource::new(10_000, 1);
        source.rate_limit_after = Some(2);
        let fetcher = TweetFetcher::new(Arc::new(source));
        let selector = QuerySelector::SearchTerm("rust".to_string());

        let batch = fetcher.fetch(&selector, Watermark::None).await.unwrap();

        assert_eq!(batch.stop_reason, StopReason::RateLimited);
        assert_eq!(batch.len(), 200);
        assert_eq!(batch.requests, 3);
    }

    #[tokio::test]
    async fn test_rate_limited_first_call_is_empty_batch() {
        let mut source = RangeSource::new(10, 1);
        source.rate_limit_after = Some(0);
        let fetcher = TweetFetcher::new(Arc::new(source));

        let batch = fetcher
            .fetch(&QuerySelector::SearchTerm("x".to_string()), Watermark::None)
            .await
            .unwrap();

        assert!(batch.is_empty());
        assert_eq!(batch.newest_id(), None);
    }

    #[tokio::test]
    async fn test_filters_records_source_should_not_return() {
        let fetcher = TweetFetcher::new(Arc::new(StubbornSource));
        let selector = QuerySelector::SearchTerm("x".to_string());

        let batch = fetcher.fetch(&selector, Watermark::Id(3)).await.unwrap();

        assert_eq!(ids(&batch), vec![5, 4]);
        assert_eq!(batch.stop_reason, StopReason::ReachedWatermark);
        assert_eq!(batch.requests, 1);
    }

    #[tokio::test]
    async fn test_no_duplicates_when_source_ignores_cursor() {
        let fetcher = TweetFetcher::new(Arc::new(StubbornSource));
        let selector = QuerySelector::SearchTerm("x".to_string());

        let batch = fetcher.fetch(&selector, Watermark::None).await.unwrap();

        // Second page repeats ids above the cursor and is dropped entirely
        assert_eq!(ids(&batch), vec![5, 4, 3, 2, 1]);
        assert_eq!(batch.requests, 2);
    }

    #[tokio::test]
    async fn test_fetch_latest_is_single_page() {
        let source = Arc::new(RangeSource::new(1000, 1));
        let fetcher = TweetFetcher::new(source.clone());

        let batch = fetcher.fetch_latest(&QuerySelector::UserId(7)).await.unwrap();

        assert_eq!(batch.len(), 200);
        assert_eq!(batch.requests, 1);
        assert_eq!(source.seen.lock().unwrap()[0], (None, None));
    }

    #[tokio::test]
    async fn test_hard_error_surfaces() {
        struct Unauthorized;

        #[async_trait]
        impl TweetSource for Unauthorized {
            async fn fetch_page(&self, _request: &PageRequest<'_>) -> Result<PageOutcome, SourceError> {
                Err(SourceError::Unauthorized("Not authorized.".to_string()))
            }
        }

        let fetcher = TweetFetcher::new(Arc::new(Unauthorized));
        let result = fetcher.fetch_latest(&QuerySelector::UserId(1)).await;

        assert!(matches!(
            result,
            Err(PipelineError::SourceError(SourceError::Unauthorized(_)))
        ));
    }
}
