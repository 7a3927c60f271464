//! Orchestrator module for the tweet indexer pipeline.
//!
//! Composes the fetcher, processor, loader and checkpoint components into
//! the run modes. The store handle and index name are passed to every run
//! rather than held by the orchestrator.

mod workers;

pub use workers::{partition_targets, BatchReport, WorkerReport};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use tweet_indexer_repository::DocumentStore;
use tweet_indexer_shared::Watermark;

use crate::checkpoint::{CheckpointResolver, FileCheckpoint, StoreCheckpoint};
use crate::errors::PipelineError;
use crate::fetcher::{Batch, FetcherConfig, StopReason, TweetFetcher};
use crate::loader::{self, LoadResult};
use crate::output;
use crate::processor::{ProcessedBatch, TweetProcessor};
use crate::source::{QuerySelector, TweetSource};

/// Configuration for the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub fetcher: FetcherConfig,
}

/// Outcome of a single-target run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Records returned by the fetcher.
    pub fetched: usize,
    pub requests: u32,
    pub stop_reason: StopReason,
    /// Documents produced by the transformer.
    pub transformed: usize,
    /// Records the transformer rejected.
    pub rejected: usize,
    /// Store outcome, for store destinations.
    pub load: Option<LoadResult>,
    /// File written, for file destinations with a non-empty batch.
    pub output_file: Option<PathBuf>,
    /// Watermark the checkpoint file was advanced to.
    pub checkpoint: Option<u64>,
}

impl RunReport {
    fn new(batch: &Batch, processed: &ProcessedBatch) -> Self {
        Self {
            fetched: batch.len(),
            requests: batch.requests,
            stop_reason: batch.stop_reason,
            transformed: processed.documents.len(),
            rejected: processed.rejected,
            load: None,
            output_file: None,
            checkpoint: None,
        }
    }

    /// `false` if the store reported any item error.
    pub fn succeeded(&self) -> bool {
        self.load.as_ref().map_or(true, |load| load.success)
    }
}

/// Outcome of an upload run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadReport {
    /// Bulk files found.
    pub files: usize,
    /// Files whose every item indexed cleanly.
    pub uploaded: usize,
    pub failed: Vec<PathBuf>,
}

/// Orchestrator that coordinates the pipeline components.
pub struct Orchestrator {
    fetcher: TweetFetcher,
    processor: TweetProcessor,
}

impl Orchestrator {
    /// Create a new orchestrator fetching from `source`.
    pub fn new(source: Arc<dyn TweetSource>) -> Self {
        Self::with_config(source, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(source: Arc<dyn TweetSource>, config: OrchestratorConfig) -> Self {
        Self {
            fetcher: TweetFetcher::with_config(source, config.fetcher),
            processor: TweetProcessor::new(),
        }
    }

    /// Fetch the latest page of a user's timeline and index it.
    #[instrument(skip(self, store, index, selector), fields(selector = %selector, index = %index))]
    pub async fn run_user(
        &self,
        store: &dyn DocumentStore,
        index: &str,
        selector: &QuerySelector,
    ) -> Result<RunReport, PipelineError> {
        let batch = self.fetcher.fetch_latest(selector).await?;
        self.load(store, index, batch).await
    }

    /// Fetch the latest page of a user's timeline and write it to a file.
    #[instrument(skip(self, selector), fields(selector = %selector))]
    pub async fn run_user_to_file(
        &self,
        selector: &QuerySelector,
        output_prefix: &Path,
    ) -> Result<RunReport, PipelineError> {
        let batch = self.fetcher.fetch_latest(selector).await?;
        let processed = self.processor.process_batch(&batch.records);

        let mut report = RunReport::new(&batch, &processed);
        report.output_file = write_documents(output_prefix, &processed).await?;
        info!(fetched = report.fetched, "User run finished");
        Ok(report)
    }

    /// Index everything newer than the newest document already in `index`.
    #[instrument(skip(self, store, index), fields(index = %index))]
    pub async fn run_term(
        &self,
        store: &dyn DocumentStore,
        index: &str,
        term: &str,
    ) -> Result<RunReport, PipelineError> {
        let watermark = StoreCheckpoint::new(store, index).watermark().await?;
        let selector = QuerySelector::SearchTerm(term.to_string());

        let batch = self.fetcher.fetch(&selector, watermark).await?;
        self.load(store, index, batch).await
    }

    /// Write everything newer than the file checkpoint to a timestamped file,
    /// then advance the checkpoint to the newest fetched identifier.
    ///
    /// The checkpoint is left untouched when nothing new was fetched or the
    /// write failed.
    /// Records rejected by the transformer still advance the checkpoint and
    /// are not fetched again.
    #[instrument(skip(self, checkpoint), fields(checkpoint = %checkpoint.path().display()))]
    pub async fn run_term_to_file(
        &self,
        term: &str,
        output_prefix: &Path,
        checkpoint: &FileCheckpoint,
    ) -> Result<RunReport, PipelineError> {
        let watermark = checkpoint.watermark().await?;
        let selector = QuerySelector::SearchTerm(term.to_string());

        let batch = self.fetcher.fetch(&selector, watermark).await?;
        let processed = self.processor.process_batch(&batch.records);

        let mut report = RunReport::new(&batch, &processed);
        report.output_file = write_documents(output_prefix, &processed).await?;

        if let Some(newest) = batch.newest_id() {
            checkpoint.advance(newest).await?;
            report.checkpoint = Some(newest);
        }

        info!(
            fetched = report.fetched,
            watermark = %Watermark::from(report.checkpoint),
            "Term run finished"
        );
        Ok(report)
    }

    /// Run user mode for every target, spread over `workers` tasks.
    ///
    /// Targets are assigned statically by position modulo `workers`. A failing
    /// target is logged and counted; a panicking worker loses only its own
    /// remaining targets.
    #[instrument(skip(self, store, index, targets), fields(index = %index, targets = targets.len()))]
    pub async fn run_target_list(
        self: &Arc<Self>,
        store: Arc<dyn DocumentStore>,
        index: &str,
        targets: &[u64],
        workers: usize,
    ) -> Result<BatchReport, PipelineError> {
        if workers == 0 {
            return Err(PipelineError::config("worker count must be at least 1"));
        }

        let partitions = partition_targets(targets, workers);
        let mut handles = Vec::with_capacity(workers);

        for (worker_id, partition) in partitions.into_iter().enumerate() {
            let orchestrator = Arc::clone(self);
            let store = Arc::clone(&store);
            let index = index.to_string();
            let assigned = partition.len();

            let handle = tokio::spawn(async move {
                orchestrator
                    .run_partition(worker_id, store.as_ref(), &index, partition)
                    .await
            });
            handles.push((worker_id, assigned, handle));
        }

        let mut report = BatchReport::default();
        for (worker_id, assigned, handle) in handles {
            match handle.await {
                Ok(worker) => report.workers.push(worker),
                Err(e) => {
                    error!(worker_id = worker_id, error = %e, "Worker terminated abnormally");
                    report.workers.push(WorkerReport {
                        worker_id,
                        assigned,
                        panicked: true,
                        ..Default::default()
                    });
                }
            }
        }

        info!(
            targets = report.targets(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "List run finished"
        );
        Ok(report)
    }

    /// [`run_target_list`](Self::run_target_list) with targets read from a file.
    pub async fn run_target_list_file(
        self: &Arc<Self>,
        store: Arc<dyn DocumentStore>,
        index: &str,
        path: &Path,
        workers: usize,
    ) -> Result<BatchReport, PipelineError> {
        let targets = output::read_target_list(path).await?;
        self.run_target_list(store, index, &targets, workers).await
    }

    /// Bulk-submit every output file in `dir` to `index`.
    ///
    /// A file that cannot be read or stores with item errors is logged and
    /// counted; the remaining files are still submitted.
    #[instrument(skip(store, index, dir), fields(dir = %dir.display(), index = %index))]
    pub async fn upload_directory(
        store: &dyn DocumentStore,
        index: &str,
        dir: &Path,
    ) -> Result<UploadReport, PipelineError> {
        let files = output::list_bulk_files(dir).await?;
        let mut report = UploadReport {
            files: files.len(),
            ..Default::default()
        };

        for path in files {
            let result = match output::read_bulk_file(&path).await {
                Ok(lines) => loader::load_lines(store, index, lines).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(load) if load.success => {
                    info!(path = %path.display(), count = load.total, "Uploaded file");
                    report.uploaded += 1;
                }
                Ok(load) => {
                    warn!(path = %path.display(), failed = load.failed, "File uploaded with errors");
                    report.failed.push(path);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to upload file");
                    report.failed.push(path);
                }
            }
        }

        info!(files = report.files, uploaded = report.uploaded, "Upload finished");
        Ok(report)
    }

    async fn run_partition(
        &self,
        worker_id: usize,
        store: &dyn DocumentStore,
        index: &str,
        targets: Vec<u64>,
    ) -> WorkerReport {
        let mut report = WorkerReport {
            worker_id,
            assigned: targets.len(),
            ..Default::default()
        };

        for target in targets {
            let selector = QuerySelector::UserId(target);
            match self.run_user(store, index, &selector).await {
                Ok(run) if run.succeeded() => report.succeeded += 1,
                Ok(_) => {
                    warn!(worker_id = worker_id, user_id = target, "Target stored with errors");
                    report.failed.push(target);
                }
                Err(e) => {
                    warn!(worker_id = worker_id, user_id = target, error = %e, "Target failed");
                    report.failed.push(target);
                }
            }
        }

        report
    }

    async fn load(
        &self,
        store: &dyn DocumentStore,
        index: &str,
        batch: Batch,
    ) -> Result<RunReport, PipelineError> {
        let processed = self.processor.process_batch(&batch.records);
        let load = loader::load_documents(store, index, &processed.documents).await?;

        let mut report = RunReport::new(&batch, &processed);
        report.load = Some(load);

        info!(
            fetched = report.fetched,
            transformed = report.transformed,
            success = report.succeeded(),
            "Run finished"
        );
        Ok(report)
    }
}

/// Write documents to a new output file; nothing is written for an empty batch.
async fn write_documents(
    output_prefix: &Path,
    processed: &ProcessedBatch,
) -> Result<Option<PathBuf>, PipelineError> {
    if processed.documents.is_empty() {
        return Ok(None);
    }
    let lines = loader::build_bulk_lines(&processed.documents)?;
    output::write_bulk_file(output_prefix, &lines).await.map(Some)
}
