//! # Tweet Indexer Pipeline
//!
//! This crate provides the pipeline components for incrementally harvesting
//! tweets from the remote API and indexing them into OpenSearch or local
//! bulk files.
//!
//! ## Architecture
//!
//! The pipeline follows the Fetcher-Processor-Loader pattern:
//!
//! 1. **Fetcher**: Pages backward through the source down to the watermark
//! 2. **Processor**: Transforms raw tweets into search documents
//! 3. **Loader**: Bulk-indexes documents, or writes them to a bulk file
//! 4. **Checkpoint**: Resolves the watermark from the index or a file
//! 5. **Orchestrator**: Composes the above into the run modes

pub mod checkpoint;
pub mod errors;
pub mod fetcher;
pub mod loader;
pub mod orchestrator;
pub mod output;
pub mod processor;
pub mod source;

pub use errors::PipelineError;
pub use orchestrator::{BatchReport, Orchestrator, OrchestratorConfig, RunReport, UploadReport};
