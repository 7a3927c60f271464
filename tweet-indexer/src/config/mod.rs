//! Runtime configuration for the tweet indexer.
//!
//! Values come from the environment (optionally seeded from a `.env` file)
//! and can be overridden by command-line flags.

mod dependencies;

pub use dependencies::{build_orchestrator, connect_store};

use std::env;
use std::path::PathBuf;

use crate::IndexingError;

/// Default OpenSearch URL.
pub const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

pub use tweet_indexer_pipeline::source::DEFAULT_TWITTER_API_URL;

pub const OPENSEARCH_URL_ENV: &str = "OPENSEARCH_URL";
pub const TWEET_INDEX_ENV: &str = "TWEET_INDEX";
pub const TWITTER_BEARER_TOKEN_ENV: &str = "TWITTER_BEARER_TOKEN";
pub const TWITTER_API_URL_ENV: &str = "TWITTER_API_URL";
pub const TARGET_LIST_PATH_ENV: &str = "TARGET_LIST_PATH";

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub opensearch_url: String,
    pub index: Option<String>,
    pub bearer_token: Option<String>,
    pub twitter_api_url: String,
    pub target_list_path: Option<PathBuf>,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `TWEET_INDEX`: Index name
    /// - `TWITTER_BEARER_TOKEN`: App-only bearer token for the Twitter API
    /// - `TWITTER_API_URL`: API root (default: https://api.twitter.com/1.1/)
    /// - `TARGET_LIST_PATH`: Target list used by list mode
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            opensearch_url: get(OPENSEARCH_URL_ENV).unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            index: get(TWEET_INDEX_ENV),
            bearer_token: get(TWITTER_BEARER_TOKEN_ENV),
            twitter_api_url: get(TWITTER_API_URL_ENV).unwrap_or_else(|| DEFAULT_TWITTER_API_URL.to_string()),
            target_list_path: get(TARGET_LIST_PATH_ENV).map(PathBuf::from),
        }
    }

    /// The index name, required by store destinations.
    pub fn index(&self) -> Result<&str, IndexingError> {
        self.index.as_deref().ok_or_else(|| {
            IndexingError::config(format!("no index name; set {} or pass --index", TWEET_INDEX_ENV))
        })
    }

    /// The bearer token, required by every fetching mode.
    pub fn bearer_token(&self) -> Result<&str, IndexingError> {
        self.bearer_token
            .as_deref()
            .ok_or_else(|| IndexingError::config(format!("{} is not set", TWITTER_BEARER_TOKEN_ENV)))
    }
}
