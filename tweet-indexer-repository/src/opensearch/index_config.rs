//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the tweet index.

use serde_json::{json, Value};

/// Get the index settings and mappings for the tweet index.
///
/// Only fields that need a non-default type are mapped explicitly; the rest
/// of the document is mapped dynamically.
///
/// - **@timestamp**: date, the sort key for checkpoint lookups
/// - **Keyword fields**: hashtags, URL domains, client source, ids
/// - **full_text**: analyzed text
///
/// # Sharding Configuration
///
/// - Default primary shards
/// - 0 replicas (single-node deployments)
pub fn get_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_replicas": 0
        },
        "mappings": {
            "properties": {
                "@timestamp": {
                    "type": "date"
                },
                "entities": {
                    "properties": {
                        "hashtags": {
                            "type": "keyword"
                        },
                        "urls": {
                            "properties": {
                                "display_url": { "type": "keyword" },
                                "expanded_url": { "type": "keyword" },
                                "indices": { "type": "long" },
                                "url": { "type": "keyword" }
                            }
                        },
                        "media": {
                            "properties": {
                                "expanded_url": { "type": "keyword" },
                                "source_status_id_str": { "type": "keyword" },
                                "source_user_id_str": { "type": "keyword" }
                            }
                        }
                    }
                },
                "favorite_count": {
                    "type": "long"
                },
                "source": {
                    "type": "keyword"
                },
                "time_of_day": {
                    "type": "long"
                },
                "favorited": {
                    "type": "boolean"
                },
                "full_text": {
                    "type": "text"
                },
                "id": {
                    "type": "long"
                },
                "id_str": {
                    "type": "keyword"
                }
            }
        }
    })
}
