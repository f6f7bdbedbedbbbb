//! Cache Document Module
//!
//! The payload side of the cache: the metadata every cached document carries
//! and the trait tying a payload type to its stable type name.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

// == Document Meta ==
/// Identity of a cached document.
///
/// Payload types embed this with `#[serde(flatten)]` so `key` and `sub_key`
/// sit next to their own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Logical key
    pub key: String,
    /// Sub-key of a specific entry, None for plain entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_key: Option<String>,
}

impl DocumentMeta {
    // == Constructor ==
    /// Creates metadata for `key`, generating a fresh key when none is given.
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: key.unwrap_or_else(generate_key),
            sub_key: None,
        }
    }

    /// Creates metadata for a specific entry.
    pub fn with_sub_key(key: impl Into<String>, sub_key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            sub_key: Some(sub_key.into()),
        }
    }
}

impl Default for DocumentMeta {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Generates a unique key (UUID v7, time ordered).
pub fn generate_key() -> String {
    Uuid::now_v7().to_string()
}

// == Cache Document Trait ==
/// A payload type the repository can store and materialize.
///
/// `DOC_TYPE` must be stable across builds and must not contain `|`: it is
/// part of the physical id of specific entries and the value counted by
/// `get_doc_count`.
pub trait CacheDocument: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable type name
    const DOC_TYPE: &'static str;

    fn meta(&self) -> &DocumentMeta;

    fn meta_mut(&mut self) -> &mut DocumentMeta;

    fn key(&self) -> &str {
        &self.meta().key
    }

    fn sub_key(&self) -> Option<&str> {
        self.meta().sub_key.as_deref()
    }
}

// == Base Document ==
/// A document with no fields beyond its identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
}

impl BaseDocument {
    pub fn new(key: Option<String>) -> Self {
        Self {
            meta: DocumentMeta::new(key),
        }
    }
}

impl CacheDocument for BaseDocument {
    const DOC_TYPE: &'static str = "BaseDocument";

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

// == JSON Document ==
/// A document holding an arbitrary JSON value; the payload type of the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub value: serde_json::Value,
}

impl JsonDocument {
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            meta: DocumentMeta::new(Some(key.into())),
            value,
        }
    }
}

impl CacheDocument for JsonDocument {
    const DOC_TYPE: &'static str = "JsonDocument";

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}
