//! Timestamp helpers for the remote API's fixed creation-date format.

use chrono::{NaiveDateTime, ParseError, Timelike};

/// Format of `created_at` fields delivered by the remote API,
/// e.g. `Wed Sep 02 05:16:23 +0000 2020`.
pub const TWITTER_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S +0000 %Y";

/// ISO-8601 format (seconds precision, no offset) used in indexed documents.
pub const ISO_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a remote API `created_at` value.
pub fn parse_twitter_timestamp(raw: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(raw, TWITTER_TIMESTAMP_FORMAT)
}

/// Render a timestamp as ISO-8601 for indexing.
pub fn to_iso(timestamp: &NaiveDateTime) -> String {
    timestamp.format(ISO_TIMESTAMP_FORMAT).to_string()
}

/// Parse a remote API `created_at` value and render it as ISO-8601.
pub fn reformat(raw: &str) -> Result<String, ParseError> {
    parse_twitter_timestamp(raw).map(|ts| to_iso(&ts))
}

/// Seconds elapsed since midnight of the timestamp's own day.
pub fn seconds_since_midnight(timestamp: &NaiveDateTime) -> u32 {
    timestamp.time().num_seconds_from_midnight()
}
