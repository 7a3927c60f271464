mod common;

use std::collections::HashSet;
use std::sync::Arc;

use tweet_indexer_pipeline::checkpoint::FileCheckpoint;
use tweet_indexer_pipeline::fetcher::StopReason;
use tweet_indexer_pipeline::output::read_bulk_file;
use tweet_indexer_pipeline::Orchestrator;

use common::{GrowingTimeline, MemoryStore};

fn document_ids(lines: &[serde_json::Value]) -> Vec<String> {
    lines
        .iter()
        .step_by(2)
        .map(|action| action["index"]["_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn successive_term_to_file_runs_do_not_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("rust");
    let checkpoint = FileCheckpoint::new(dir.path().join("rust.checkpoint"));

    let timeline = Arc::new(GrowingTimeline::new(150));
    let orchestrator = Orchestrator::new(timeline.clone());

    let first = orchestrator.run_term_to_file("rust", &prefix, &checkpoint).await.unwrap();
    assert_eq!(first.fetched, 150);
    assert_eq!(first.stop_reason, StopReason::Exhausted);
    assert_eq!(first.checkpoint, Some(150));

    timeline.grow_to(180);

    let second = orchestrator.run_term_to_file("rust", &prefix, &checkpoint).await.unwrap();
    assert_eq!(second.fetched, 30);
    assert_eq!(second.checkpoint, Some(180));

    let first_ids = document_ids(&read_bulk_file(&first.output_file.unwrap()).await.unwrap());
    let second_ids = document_ids(&read_bulk_file(&second.output_file.unwrap()).await.unwrap());

    let first_set: HashSet<&String> = first_ids.iter().collect();
    assert!(second_ids.iter().all(|id| !first_set.contains(id)));
    assert_eq!(first_ids.len() + second_ids.len(), 180);
    assert_eq!(second_ids.first().map(String::as_str), Some("180"));
}

#[tokio::test]
async fn term_to_file_without_new_tweets_keeps_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("rust");
    let checkpoint = FileCheckpoint::new(dir.path().join("rust.checkpoint"));
    checkpoint.advance(75).await.unwrap();

    let orchestrator = Orchestrator::new(Arc::new(GrowingTimeline::new(75)));
    let report = orchestrator.run_term_to_file("rust", &prefix, &checkpoint).await.unwrap();

    assert_eq!(report.fetched, 0);
    assert!(report.output_file.is_none());
    assert!(report.checkpoint.is_none());

    let stored = std::fs::read_to_string(checkpoint.path()).unwrap();
    assert_eq!(stored.trim(), "75");

    // Only the checkpoint file exists; no empty output file was created
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn failed_output_write_keeps_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("missing").join("dir").join("out");
    let checkpoint = FileCheckpoint::new(dir.path().join("rust.checkpoint"));
    checkpoint.advance(5).await.unwrap();

    let orchestrator = Orchestrator::new(Arc::new(GrowingTimeline::new(30)));
    let result = orchestrator.run_term_to_file("rust", &prefix, &checkpoint).await;

    assert!(result.is_err());
    let stored = std::fs::read_to_string(checkpoint.path()).unwrap();
    assert_eq!(stored, "5\n");
}

#[tokio::test]
async fn term_runs_resume_from_index() {
    let store = MemoryStore::default();
    let timeline = Arc::new(GrowingTimeline::new(120));
    let orchestrator = Orchestrator::new(timeline.clone());

    let first = orchestrator.run_term(&store, "tweets", "rust").await.unwrap();
    assert!(first.succeeded());
    assert_eq!(first.fetched, 120);

    timeline.grow_to(125);
    let second = orchestrator.run_term(&store, "tweets", "rust").await.unwrap();

    assert_eq!(second.fetched, 5);
    assert_eq!(store.ids().len(), 125);
}

#[tokio::test]
async fn upload_replays_written_files() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoint = FileCheckpoint::new(dir.path().join("rust.checkpoint"));
    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();

    let timeline = Arc::new(GrowingTimeline::new(40));
    let orchestrator = Orchestrator::new(timeline.clone());
    orchestrator
        .run_term_to_file("rust", &out_dir.join("rust"), &checkpoint)
        .await
        .unwrap();
    timeline.grow_to(60);
    orchestrator
        .run_term_to_file("rust", &out_dir.join("rust"), &checkpoint)
        .await
        .unwrap();

    let store = MemoryStore::default();
    let report = Orchestrator::upload_directory(&store, "tweets", &out_dir).await.unwrap();

    assert_eq!(report.files, 2);
    assert_eq!(report.uploaded, 2);
    assert_eq!(store.ids().len(), 60);
}
