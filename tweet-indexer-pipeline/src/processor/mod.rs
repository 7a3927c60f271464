//! Processor module for the tweet indexer pipeline.
//!
//! Transforms raw tweets into search documents.

mod transformer;
mod tweet_processor;

pub use transformer::{clean_source, domain_of, transform, TransformError, TweetTransformer};
pub use tweet_processor::{ProcessedBatch, TweetProcessor};
