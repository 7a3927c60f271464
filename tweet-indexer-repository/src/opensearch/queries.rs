//! OpenSearch request builders and response parsers.
//!
//! Kept free of I/O so the wire shapes can be tested without a cluster.

use serde_json::{json, Value};

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationResult, BatchOperationSummary};

/// Build the "newest document by `@timestamp`" query used for checkpoints.
pub fn build_most_recent_query() -> Value {
    json!({
        "query": {
            "match_all": {}
        },
        "size": 1,
        "sort": [
            { "@timestamp": { "order": "desc" } }
        ]
    })
}

/// Extract the `_id` of the first hit of a search response.
///
/// Returns `None` when the response holds no hits.
pub fn parse_most_recent_id(response: &Value) -> Option<String> {
    let hit = response
        .get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(|h| h.as_array())
        .and_then(|hits| hits.first())?;

    match hit.get("_id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Interpret a bulk response body.
///
/// The top-level `errors` flag is required; per-item outcomes are read from
/// `items` where each entry is keyed by its action (`index`, `create`, ...).
pub fn parse_bulk_response(response: &Value) -> Result<BatchOperationSummary, SearchIndexError> {
    let errors = response
        .get("errors")
        .and_then(|e| e.as_bool())
        .ok_or_else(|| SearchIndexError::parse("Bulk response has no `errors` flag"))?;

    let results = response
        .get("items")
        .and_then(|i| i.as_array())
        .map(|items| items.iter().filter_map(parse_bulk_item).collect())
        .unwrap_or_default();

    Ok(BatchOperationSummary::from_results(results, errors))
}

/// Parse one entry of a bulk response's `items` array.
fn parse_bulk_item(item: &Value) -> Option<BatchOperationResult> {
    let outcome = item.as_object()?.values().next()?;

    let document_id = match outcome.get("_id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    };

    let error = outcome.get("error").map(|e| {
        e.get("reason")
            .and_then(|r| r.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| e.to_string())
    });

    Some(BatchOperationResult {
        document_id,
        success: error.is_none(),
        error,
    })
}
