//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

/// Request body for storing a plain entry (PUT /docs/:key)
///
/// # Fields
/// - `value`: The JSON value to store
/// - `ttl`: Optional TTL in seconds (no expiry if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_ttl(self.ttl)
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl.map(Duration::from_secs)
    }
}

/// Request body for storing a specific entry (PUT /docs/:key/specific)
#[derive(Debug, Clone, Deserialize)]
pub struct SetSpecificRequest {
    /// The value to store
    pub value: Value,
    /// Sub-key; generated when absent
    #[serde(default)]
    pub sub_key: Option<String>,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetSpecificRequest {
    pub fn validate(&self) -> Option<String> {
        if self.sub_key.as_deref() == Some("") {
            return Some("Sub-key cannot be empty".to_string());
        }
        validate_ttl(self.ttl)
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl.map(Duration::from_secs)
    }
}

fn validate_ttl(ttl: Option<u64>) -> Option<String> {
    match ttl {
        Some(0) => Some("TTL must be at least 1 second".to_string()),
        _ => None,
    }
}
