//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{CacheDocument, CacheStats, JsonDocument};

/// Response body for document reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    /// Logical key
    pub key: String,
    /// Sub-key of a specific entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_key: Option<String>,
    /// The stored value
    pub value: Value,
}

impl From<JsonDocument> for DocumentResponse {
    fn from(doc: JsonDocument) -> Self {
        Self {
            key: doc.meta.key,
            sub_key: doc.meta.sub_key,
            value: doc.value,
        }
    }
}

/// Response body for document writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// The resolved sub-key, for specific entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_key: Option<String>,
}

impl SetResponse {
    /// Creates a new SetResponse for a plain entry
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
            sub_key: None,
        }
    }

    /// Creates a new SetResponse for a specific entry
    pub fn specific(key: impl Into<String>, sub_key: impl Into<String>) -> Self {
        let key = key.into();
        let sub_key = sub_key.into();
        Self {
            message: format!("Key '{}' sub-key '{}' set successfully", key, sub_key),
            key,
            sub_key: Some(sub_key),
        }
    }
}

/// Response body for removals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was removed
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed", key),
            key,
        }
    }
}

/// Response body for DELETE /docs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
    pub collection: String,
}

impl ClearResponse {
    pub fn new(collection: impl Into<String>) -> Self {
        let collection = collection.into();
        Self {
            message: format!("Collection '{}' cleared", collection),
            collection,
        }
    }
}

/// Response body for GET /count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Type name that was counted
    pub doc_type: String,
    /// Number of live documents
    pub count: u64,
}

impl CountResponse {
    pub fn json_documents(count: u64) -> Self {
        Self {
            doc_type: JsonDocument::DOC_TYPE.to_string(),
            count,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of misses caused by expired records
    pub expirations: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
