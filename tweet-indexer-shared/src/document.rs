//! Normalized tweet document stored in the search index.

use serde::Serialize;
use serde_json::{Map, Value};

/// A tweet normalized for indexing.
///
/// Fields the transformer does not derive or trim are carried in `extra`
/// and serialized at the top level next to the derived ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TweetDocument {
    pub id: u64,
    pub id_str: String,
    /// Creation time as ISO-8601.
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    /// Seconds since midnight of the creation day.
    pub time_of_day: u32,
    pub user: TrimmedUser,
    /// Client name with the surrounding markup removed.
    pub source: String,
    pub is_retweet_status: bool,
    pub is_quote_status: bool,
    pub entities: DocumentEntities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retweeted_status: Option<TrimmedStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_status: Option<QuotedStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TweetDocument {
    /// Identifier used as the index document `_id`.
    pub fn document_id(&self) -> &str {
        &self.id_str
    }
}

/// User object reduced to the indexed whitelist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrimmedUser {
    pub id_str: String,
    pub name: String,
    pub screen_name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub protected: bool,
    pub followers_count: u64,
    pub utc_offset: Option<i64>,
    /// Account creation time as ISO-8601.
    pub created_at: String,
}

/// A nested retweet or quote reduced to its timestamp and author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrimmedStatus {
    /// Present for retweets, absent for quotes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_str: Option<String>,
    pub created_at: String,
    pub user: TrimmedUser,
}

/// The quoted tweet, either trimmed or left as received.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuotedStatus {
    Trimmed(TrimmedStatus),
    /// Shapes that could not be trimmed, e.g. a quote of a retweet.
    Untouched(Value),
}

/// Entity collections after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentEntities {
    /// Lower-cased tag text.
    pub hashtags: Vec<String>,
    pub urls: Vec<UrlEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<Map<String, Value>>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// URL entity with `display_url` reduced to the bare domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlEntity {
    pub display_url: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}
