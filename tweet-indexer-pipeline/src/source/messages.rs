//! Request and response types exchanged with the tweet source.

use std::fmt;

use thiserror::Error;
use tweet_indexer_shared::RawRecord;

/// Page size for per-user timelines.
pub const TIMELINE_PAGE_SIZE: u32 = 200;

/// Page size for term searches.
pub const SEARCH_PAGE_SIZE: u32 = 100;

/// What to fetch tweets for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySelector {
    /// A user's timeline, by numeric id.
    UserId(u64),
    /// A user's timeline, by handle.
    ScreenName(String),
    /// Recent tweets matching a search term.
    SearchTerm(String),
}

impl QuerySelector {
    /// Interpret a target given on the command line: digits are a user id,
    /// anything else a handle (a leading `@` is dropped).
    pub fn target(value: &str) -> Self {
        match value.parse::<u64>() {
            Ok(id) => Self::UserId(id),
            Err(_) => Self::ScreenName(value.trim_start_matches('@').to_string()),
        }
    }

    /// Fixed page size the remote allows for this kind of query.
    pub fn page_size(&self) -> u32 {
        match self {
            Self::SearchTerm(_) => SEARCH_PAGE_SIZE,
            Self::UserId(_) | Self::ScreenName(_) => TIMELINE_PAGE_SIZE,
        }
    }

    /// Whether this is a search rather than a user timeline.
    pub fn is_search(&self) -> bool {
        matches!(self, Self::SearchTerm(_))
    }
}

impl fmt::Display for QuerySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserId(id) => write!(f, "user:{}", id),
            Self::ScreenName(name) => write!(f, "user:@{}", name),
            Self::SearchTerm(term) => write!(f, "search:{}", term),
        }
    }
}

/// One page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<'a> {
    pub selector: &'a QuerySelector,
    /// Maximum number of records to return.
    pub count: u32,
    /// Only records with an id at or below this (the cursor).
    pub max_id: Option<u64>,
    /// Only records with an id strictly above this (the watermark).
    pub since_id: Option<u64>,
}

/// Outcome of one page request.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// Records newest-first. Empty when the history is exhausted.
    Records(Vec<RawRecord>),
    /// The remote refused the request because the rate limit window is spent.
    RateLimited,
}

/// Hard failures reported by the tweet source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Credentials were rejected or the target is not visible.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The request could not be sent or the response not read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with an unexpected status.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SourceError {
    /// Create an invalid response error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
