//! Tweet transformer.
//!
//! Normalizes one raw tweet into a [`TweetDocument`]: ISO timestamps,
//! whitelisted user fields, bare client names and domains, lower-cased
//! hashtags, trimmed nested statuses and stripped media.

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use tweet_indexer_shared::timestamp::{parse_twitter_timestamp, reformat, seconds_since_midnight, to_iso};
use tweet_indexer_shared::{
    DocumentEntities, QuotedStatus, RawEntities, RawRecord, RawRetweetedStatus, RawTweet, RawUser,
    TrimmedStatus, TrimmedUser, TweetDocument, UrlEntity,
};

/// Media item fields removed before indexing.
const STRIPPED_MEDIA_FIELDS: [&str; 5] = ["media_url", "media_url_https", "sizes", "display_url", "id_str"];

/// Top-level keys the document derives itself; stale copies in a raw record are dropped.
const DERIVED_FIELDS: [&str; 3] = ["@timestamp", "time_of_day", "is_retweet_status"];

/// Errors produced while transforming a tweet.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Serialization was requested before a record was populated.
    #[error("Transformer has not been populated")]
    NotPopulated,

    /// A record was populated into a transformer that already holds one.
    #[error("Transformer is already populated; reset it first")]
    AlreadyPopulated,

    /// The record is missing required fields or has the wrong types.
    #[error("Malformed record: {0}")]
    Malformed(String),

    /// A creation timestamp was not in the expected format.
    #[error("Invalid timestamp in `{field}`: {message}")]
    InvalidTimestamp { field: &'static str, message: String },

    /// The normalized document could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransformError {
    /// Create a malformed record error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    fn timestamp(field: &'static str, err: chrono::ParseError) -> Self {
        Self::InvalidTimestamp {
            field,
            message: err.to_string(),
        }
    }
}

/// Single-use holder for one normalized tweet.
///
/// Starts empty. [`populate`](Self::populate) either stores a fully
/// normalized document or leaves the transformer empty.
#[derive(Debug, Default)]
pub struct TweetTransformer {
    document: Option<TweetDocument>,
}

impl TweetTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_none()
    }

    /// Normalize `raw` and hold the result.
    pub fn populate(&mut self, raw: &RawRecord) -> Result<&TweetDocument, TransformError> {
        if self.document.is_some() {
            return Err(TransformError::AlreadyPopulated);
        }
        let document = transform(raw)?;
        Ok(&*self.document.insert(document))
    }

    /// The held document.
    pub fn document(&self) -> Result<&TweetDocument, TransformError> {
        self.document.as_ref().ok_or(TransformError::NotPopulated)
    }

    /// Serialize the held document as a single JSON line.
    pub fn to_json(&self) -> Result<String, TransformError> {
        Ok(serde_json::to_string(self.document()?)?)
    }

    /// Serialize the held document as a JSON value.
    pub fn to_value(&self) -> Result<Value, TransformError> {
        Ok(serde_json::to_value(self.document()?)?)
    }

    /// Take the held document, leaving the transformer empty.
    pub fn into_document(self) -> Result<TweetDocument, TransformError> {
        self.document.ok_or(TransformError::NotPopulated)
    }

    /// Return to the empty state.
    pub fn reset(&mut self) {
        self.document = None;
    }
}

/// Quoted tweet fields needed for trimming.
#[derive(Deserialize)]
struct RawQuotedStatus {
    created_at: String,
    user: RawUser,
}

/// Normalize one raw tweet.
pub fn transform(raw: &RawRecord) -> Result<TweetDocument, TransformError> {
    let tweet: RawTweet = serde_json::from_value(raw.as_value().clone())
        .map_err(|e| TransformError::malformed(e.to_string()))?;

    let created_at =
        parse_twitter_timestamp(&tweet.created_at).map_err(|e| TransformError::timestamp("created_at", e))?;

    let user = trim_user(&tweet.user, "user.created_at")?;
    let is_retweet_status = tweet.retweeted_status.is_some();

    let retweeted_status = tweet.retweeted_status.as_ref().map(trim_retweet).transpose()?;

    let quoted_status = match tweet.quoted_status {
        Some(quoted) if tweet.is_quote_status => Some(trim_quote(quoted)?),
        Some(quoted) => Some(QuotedStatus::Untouched(quoted)),
        None => None,
    };

    let mut extra = tweet.rest;
    let entities = normalize_entities(tweet.entities, &mut extra);
    for field in DERIVED_FIELDS {
        extra.remove(field);
    }

    Ok(TweetDocument {
        id: tweet.id,
        id_str: tweet.id_str.unwrap_or_else(|| tweet.id.to_string()),
        timestamp: to_iso(&created_at),
        time_of_day: seconds_since_midnight(&created_at),
        user,
        source: clean_source(&tweet.source),
        is_retweet_status,
        is_quote_status: tweet.is_quote_status,
        entities,
        retweeted_status,
        quoted_status,
        extra,
    })
}

/// Extract the client name from `<a href="...">Client</a>`.
///
/// Returns the input unchanged when it does not have that shape.
pub fn clean_source(source: &str) -> String {
    match source.split(['<', '>']).nth(2) {
        Some(inner) => inner.to_string(),
        None => source.to_string(),
    }
}

/// Reduce a display URL to its domain.
pub fn domain_of(display_url: &str) -> String {
    display_url.split('/').next().unwrap_or(display_url).to_string()
}

fn trim_user(user: &RawUser, field: &'static str) -> Result<TrimmedUser, TransformError> {
    let created_at = reformat(&user.created_at).map_err(|e| TransformError::timestamp(field, e))?;

    Ok(TrimmedUser {
        id_str: user.id_str.clone(),
        name: user.name.clone(),
        screen_name: user.screen_name.clone(),
        location: user.location.clone(),
        description: user.description.clone(),
        protected: user.protected,
        followers_count: user.followers_count,
        utc_offset: user.utc_offset,
        created_at,
    })
}

fn trim_retweet(status: &RawRetweetedStatus) -> Result<TrimmedStatus, TransformError> {
    let created_at = reformat(&status.created_at)
        .map_err(|e| TransformError::timestamp("retweeted_status.created_at", e))?;

    Ok(TrimmedStatus {
        id_str: Some(status.id_str.clone()),
        created_at,
        user: trim_user(&status.user, "retweeted_status.user.created_at")?,
    })
}

/// A quote without its own `created_at` (a quote of a retweet) is kept as received.
fn trim_quote(quoted: Value) -> Result<QuotedStatus, TransformError> {
    if quoted.get("created_at").is_none() {
        return Ok(QuotedStatus::Untouched(quoted));
    }

    let status: RawQuotedStatus = serde_json::from_value(quoted)
        .map_err(|e| TransformError::malformed(format!("quoted_status: {}", e)))?;

    let created_at = reformat(&status.created_at)
        .map_err(|e| TransformError::timestamp("quoted_status.created_at", e))?;

    Ok(QuotedStatus::Trimmed(TrimmedStatus {
        id_str: None,
        created_at,
        user: trim_user(&status.user, "quoted_status.user.created_at")?,
    }))
}

fn normalize_entities(entities: RawEntities, extra: &mut Map<String, Value>) -> DocumentEntities {
    let hashtags = entities
        .hashtags
        .into_iter()
        .map(|tag| tag.text.to_lowercase())
        .collect();

    let urls = entities
        .urls
        .into_iter()
        .map(|url| UrlEntity {
            display_url: domain_of(&url.display_url),
            rest: url.rest,
        })
        .collect();

    let media = entities.media.map(|items| {
        extra.remove("extended_entities");
        items
            .into_iter()
            .map(|mut item| {
                for field in STRIPPED_MEDIA_FIELDS {
                    item.remove(field);
                }
                item
            })
            .collect()
    });

    DocumentEntities {
        hashtags,
        urls,
        media,
        rest: entities.rest,
    }
}
