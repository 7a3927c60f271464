//! Tweet indexer binary.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

use tweet_indexer::cli::{Cli, Commands};
use tweet_indexer::config::{build_orchestrator, connect_store, TARGET_LIST_PATH_ENV};
use tweet_indexer::{logging, IndexingError, Settings};
use tweet_indexer_pipeline::checkpoint::FileCheckpoint;
use tweet_indexer_pipeline::source::QuerySelector;
use tweet_indexer_pipeline::Orchestrator;
use tweet_indexer_repository::DocumentStore;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut settings = Settings::from_env();
    cli.apply(&mut settings);

    let outcome = tokio::select! {
        result = run(cli, settings) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; the checkpoint was not advanced for the current run");
            return ExitCode::from(130);
        }
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            warn!("Run finished with errors");
            ExitCode::from(2)
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}

/// Run the selected command. `Ok(false)` means the run completed but some
/// documents or targets failed.
async fn run(cli: Cli, settings: Settings) -> Result<bool, IndexingError> {
    let store = if cli.needs_store() {
        let store = connect_store(&settings).await?;
        store.ensure_index(settings.index()?).await?;
        Some(store)
    } else {
        None
    };

    match cli.command {
        Commands::User { target } => {
            let store = require(store)?;
            let orchestrator = build_orchestrator(&settings)?;
            let report = orchestrator
                .run_user(store.as_ref(), settings.index()?, &QuerySelector::target(&target))
                .await?;
            Ok(report.succeeded())
        }
        Commands::UserToFile { target, path } => {
            let orchestrator = build_orchestrator(&settings)?;
            let report = orchestrator
                .run_user_to_file(&QuerySelector::target(&target), &path)
                .await?;
            match &report.output_file {
                Some(file) => info!(path = %file.display(), count = report.transformed, "Timeline stored"),
                None => info!(user = %target, "No tweets fetched"),
            }
            Ok(true)
        }
        Commands::Term { term } => {
            let store = require(store)?;
            let orchestrator = build_orchestrator(&settings)?;
            let report = orchestrator.run_term(store.as_ref(), settings.index()?, &term).await?;
            Ok(report.succeeded())
        }
        Commands::TermToFile { term, path, checkpoint } => {
            let orchestrator = build_orchestrator(&settings)?;
            let checkpoint = FileCheckpoint::new(checkpoint);
            let report = orchestrator.run_term_to_file(&term, &path, &checkpoint).await?;
            if let Some(file) = &report.output_file {
                info!(path = %file.display(), count = report.transformed, "Search results stored");
            }
            Ok(true)
        }
        Commands::List { workers, .. } => {
            let store = require(store)?;
            let path = settings.target_list_path.clone().ok_or_else(|| {
                IndexingError::config(format!("no target list; set {} or pass --path", TARGET_LIST_PATH_ENV))
            })?;
            let orchestrator = build_orchestrator(&settings)?;
            let report = orchestrator
                .run_target_list_file(store, settings.index()?, &path, workers)
                .await?;
            Ok(report.is_clean())
        }
        Commands::Upload { path } => {
            let store = require(store)?;
            let report = Orchestrator::upload_directory(store.as_ref(), settings.index()?, &path).await?;
            Ok(report.failed.is_empty())
        }
    }
}

fn require(store: Option<Arc<dyn DocumentStore>>) -> Result<Arc<dyn DocumentStore>, IndexingError> {
    store.ok_or_else(|| IndexingError::config("command needs a search index connection"))
}
