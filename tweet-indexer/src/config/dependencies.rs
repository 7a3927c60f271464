//! Dependency initialization and wiring for the tweet indexer.

use std::sync::Arc;
use tracing::info;

use tweet_indexer_pipeline::source::TwitterClient;
use tweet_indexer_pipeline::Orchestrator;
use tweet_indexer_repository::{DocumentStore, OpenSearchClient};

use crate::config::Settings;
use crate::IndexingError;

/// Connect to OpenSearch and verify the cluster is usable.
pub async fn connect_store(settings: &Settings) -> Result<Arc<dyn DocumentStore>, IndexingError> {
    info!(opensearch_url = %settings.opensearch_url, "Connecting to OpenSearch");

    let client = OpenSearchClient::new(&settings.opensearch_url)
        .await
        .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;

    let healthy = client
        .health_check()
        .await
        .map_err(|e| IndexingError::config(format!("OpenSearch health check failed: {}", e)))?;

    if !healthy {
        return Err(IndexingError::config("OpenSearch cluster is unhealthy"));
    }

    info!("OpenSearch connection verified");
    Ok(Arc::new(client))
}

/// Build the orchestrator around a Twitter API client.
pub fn build_orchestrator(settings: &Settings) -> Result<Arc<Orchestrator>, IndexingError> {
    let client = TwitterClient::new(&settings.twitter_api_url, settings.bearer_token()?)?;

    info!(api_url = %settings.twitter_api_url, "Twitter client created");
    Ok(Arc::new(Orchestrator::new(Arc::new(client))))
}
