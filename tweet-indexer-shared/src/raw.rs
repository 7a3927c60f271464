//! Raw tweet records as delivered by the remote API.
//!
//! [`RawRecord`] is the opaque, as-received JSON. [`RawTweet`] is the typed
//! view the transformer validates a record against; everything it does not
//! name is kept in `rest` and passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tweet exactly as received from the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Value);

impl RawRecord {
    /// Wrap a JSON value received from the remote API.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The record's numeric identifier.
    ///
    /// Falls back to `id_str` when `id` is missing or not an unsigned integer.
    pub fn id(&self) -> Option<u64> {
        self.0.get("id").and_then(Value::as_u64).or_else(|| {
            self.0
                .get("id_str")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
        })
    }

    /// Borrow the underlying JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the underlying JSON.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Typed view of a raw tweet.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTweet {
    pub id: u64,
    #[serde(default)]
    pub id_str: Option<String>,
    /// Creation time in the remote API's fixed format.
    pub created_at: String,
    pub user: RawUser,
    /// Client string, markup-wrapped: `<a href="...">Client</a>`.
    pub source: String,
    #[serde(default)]
    pub is_quote_status: bool,
    pub entities: RawEntities,
    #[serde(default)]
    pub retweeted_status: Option<RawRetweetedStatus>,
    /// Kept loosely typed: a quote of a retweet arrives doubly nested and
    /// without its own `created_at`.
    #[serde(default)]
    pub quoted_status: Option<Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// User object embedded in a tweet.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id_str: String,
    pub name: String,
    pub screen_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub utc_offset: Option<i64>,
    pub created_at: String,
}

/// Entity collections attached to a tweet.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntities {
    #[serde(default)]
    pub hashtags: Vec<RawHashtag>,
    #[serde(default)]
    pub urls: Vec<RawUrl>,
    #[serde(default)]
    pub media: Option<Vec<Map<String, Value>>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Hashtag entity. Positional `indices` are dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHashtag {
    pub text: String,
}

/// URL entity.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUrl {
    pub display_url: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// The parts of a retweeted tweet that survive trimming.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRetweetedStatus {
    pub id_str: String,
    pub created_at: String,
    pub user: RawUser,
}
