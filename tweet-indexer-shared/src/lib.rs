//! # Tweet Indexer Shared
//!
//! Shared types used across the tweet indexer crates:
//!
//! - [`RawRecord`]: a tweet exactly as the remote API delivered it
//! - [`RawTweet`]: the typed view of a raw record used by the transformer
//! - [`TweetDocument`]: the normalized document written to the search index
//! - [`Watermark`]: the newest identifier already durably stored

pub mod document;
pub mod raw;
pub mod timestamp;
pub mod watermark;

pub use document::{DocumentEntities, QuotedStatus, TrimmedStatus, TrimmedUser, TweetDocument, UrlEntity};
pub use raw::{RawEntities, RawHashtag, RawRecord, RawRetweetedStatus, RawTweet, RawUrl, RawUser};
pub use watermark::Watermark;
