//! Error types for the tweet indexer repository.

mod search_index_error;

pub use search_index_error::SearchIndexError;
