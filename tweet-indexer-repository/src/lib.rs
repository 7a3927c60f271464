//! # Tweet Indexer Repository
//!
//! This crate provides the destination store interface used by the pipeline
//! and a concrete implementation for OpenSearch. It includes definitions for
//! errors, the `DocumentStore` trait, bulk outcome types and the tweet index
//! mappings.

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use errors::SearchIndexError;
pub use interfaces::DocumentStore;
pub use opensearch::OpenSearchClient;
pub use types::{BatchOperationResult, BatchOperationSummary};
