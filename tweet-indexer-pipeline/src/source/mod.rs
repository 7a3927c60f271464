//! Source module for the tweet indexer pipeline.
//!
//! Defines the `TweetSource` seam the fetcher pages through, and the Twitter
//! HTTP implementation of it.

mod messages;
mod twitter_client;

pub use messages::{PageOutcome, PageRequest, QuerySelector, SourceError};
pub use twitter_client::{TwitterClient, DEFAULT_TWITTER_API_URL};

use async_trait::async_trait;

/// Paginated, rate-limited access to tweets.
///
/// A rate-limit rejection is reported as [`PageOutcome::RateLimited`], not
/// as an error. `Err` is reserved for hard failures (unauthorized,
/// transport, malformed response).
#[async_trait]
pub trait TweetSource: Send + Sync {
    /// Fetch one page of records matching the request.
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<PageOutcome, SourceError>;
}
