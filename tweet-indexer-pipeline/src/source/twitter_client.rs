//! Twitter v1.1 REST implementation of the tweet source.
//!
//! Timelines come from `statuses/user_timeline.json` as a bare array;
//! searches come from `search/tweets.json` wrapped in `statuses`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use tweet_indexer_shared::RawRecord;

use crate::source::messages::{PageOutcome, PageRequest, QuerySelector, SourceError};
use crate::source::TweetSource;

/// Default API root.
pub const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com/1.1/";

const USER_TIMELINE_PATH: &str = "statuses/user_timeline.json";
const SEARCH_PATH: &str = "search/tweets.json";

/// HTTP client for the Twitter v1.1 API using bearer-token auth.
pub struct TwitterClient {
    http: reqwest::Client,
    base_url: Url,
    bearer_token: String,
}

impl TwitterClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. "https://api.twitter.com/1.1"
    /// * `bearer_token` - App-only bearer token
    pub fn new(base_url: &str, bearer_token: impl Into<String>) -> Result<Self, SourceError> {
        let bearer_token = bearer_token.into();
        if bearer_token.trim().is_empty() {
            return Err(SourceError::config("bearer token is empty"));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("tweet-indexer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            bearer_token,
        })
    }

    /// Build the full request URL for a page request.
    pub fn request_url(&self, request: &PageRequest<'_>) -> Result<Url, SourceError> {
        build_request_url(&self.base_url, request)
    }
}

#[async_trait]
impl TweetSource for TwitterClient {
    #[instrument(skip(self, request), fields(selector = %request.selector, max_id = ?request.max_id, since_id = ?request.since_id))]
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<PageOutcome, SourceError> {
        let url = self.request_url(request)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate limit exceeded");
                return Ok(PageOutcome::RateLimited);
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                return Err(SourceError::Unauthorized(body));
            }
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(SourceError::Status {
                    status: s.as_u16(),
                    body,
                });
            }
            _ => {}
        }

        let body: Value = response.json().await?;
        let records = parse_page(request.selector, body)?;

        debug!(count = records.len(), "Fetched page");
        Ok(PageOutcome::Records(records))
    }
}

/// Ensure the API root ends with a slash so relative joins keep its path.
fn normalize_base_url(base_url: &str) -> Result<Url, SourceError> {
    let with_slash = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    Url::parse(&with_slash).map_err(|e| SourceError::config(format!("invalid API URL: {}", e)))
}

/// Build the endpoint URL and query string for a page request.
fn build_request_url(base_url: &Url, request: &PageRequest<'_>) -> Result<Url, SourceError> {
    let path = if request.selector.is_search() {
        SEARCH_PATH
    } else {
        USER_TIMELINE_PATH
    };

    let mut url = base_url
        .join(path)
        .map_err(|e| SourceError::config(e.to_string()))?;

    {
        let mut query = url.query_pairs_mut();
        match request.selector {
            QuerySelector::UserId(id) => {
                query.append_pair("user_id", &id.to_string());
            }
            QuerySelector::ScreenName(name) => {
                query.append_pair("screen_name", name);
            }
            QuerySelector::SearchTerm(term) => {
                query.append_pair("q", term);
                query.append_pair("result_type", "recent");
            }
        }
        query.append_pair("count", &request.count.to_string());
        query.append_pair("tweet_mode", "extended");
        if let Some(max_id) = request.max_id {
            query.append_pair("max_id", &max_id.to_string());
        }
        if let Some(since_id) = request.since_id {
            query.append_pair("since_id", &since_id.to_string());
        }
    }

    Ok(url)
}

/// Extract the records of a page from a response body.
fn parse_page(selector: &QuerySelector, body: Value) -> Result<Vec<RawRecord>, SourceError> {
    let statuses = if selector.is_search() {
        match body {
            Value::Object(mut map) => map
                .remove("statuses")
                .ok_or_else(|| SourceError::invalid_response("search response has no `statuses`"))?,
            _ => return Err(SourceError::invalid_response("search response is not an object")),
        }
    } else {
        body
    };

    match statuses {
        Value::Array(items) => Ok(items.into_iter().map(RawRecord::new).collect()),
        _ => Err(SourceError::invalid_response("expected an array of tweets")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> TwitterClient {
        TwitterClient::new("https://api.twitter.com/1.1", "token").unwrap()
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            TwitterClient::new("https://api.twitter.com/1.1", "  "),
            Err(SourceError::Config(_))
        ));
    }

    #[test]
    fn test_search_url() {
        let selector = QuerySelector::SearchTerm("rust lang".to_string());
        let request = PageRequest {
            selector: &selector,
            count: 100,
            max_id: Some(99),
            since_id: Some(10),
        };

        let url = client().request_url(&request).unwrap();
        assert_eq!(url.path(), "/1.1/search/tweets.json");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".to_string(), "rust lang".to_string())));
        assert!(pairs.contains(&("count".to_string(), "100".to_string())));
        assert!(pairs.contains(&("max_id".to_string(), "99".to_string())));
        assert!(pairs.contains(&("since_id".to_string(), "10".to_string())));
        assert!(pairs.contains(&("result_type".to_string(), "recent".to_string())));
    }

    #[test]
    fn test_timeline_url_without_bounds() {
        let selector = QuerySelector::UserId(42);
        let request = PageRequest {
            selector: &selector,
            count: 200,
            max_id: None,
            since_id: None,
        };

        let url = client().request_url(&request).unwrap();
        assert_eq!(url.path(), "/1.1/statuses/user_timeline.json");

        let query = url.query().unwrap();
        assert!(query.contains("user_id=42"));
        assert!(query.contains("tweet_mode=extended"));
        assert!(!query.contains("max_id"));
        assert!(!query.contains("since_id"));
    }

    #[test]
    fn test_parse_search_page() {
        let selector = QuerySelector::SearchTerm("x".to_string());
        let body = json!({ "statuses": [{"id": 3}, {"id": 2}], "search_metadata": {} });

        let records = parse_page(&selector, body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), Some(3));
    }

    #[test]
    fn test_parse_timeline_page() {
        let selector = QuerySelector::ScreenName("n".to_string());
        let records = parse_page(&selector, json!([{"id": 1}])).unwrap();
        assert_eq!(records.len(), 1);

        assert!(parse_page(&selector, json!({"errors": []})).is_err());
    }

    #[test]
    fn test_parse_search_page_missing_statuses() {
        let selector = QuerySelector::SearchTerm("x".to_string());
        assert!(matches!(
            parse_page(&selector, json!({})),
            Err(SourceError::InvalidResponse(_))
        ));
    }
}
