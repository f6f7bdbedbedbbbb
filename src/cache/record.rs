//! Stored Record Module
//!
//! The envelope written to the document store for every cache entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::document::CacheDocument;
use crate::cache::key::DocumentId;
use crate::cache::ttl;
use crate::error::{CacheError, Result};

// == Stored Record ==
/// A cache entry as the store sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// `CacheDocument::DOC_TYPE` of the payload; matched by `count`'s type filter
    pub doc_type: String,
    /// Logical key
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_key: Option<String>,
    /// Write time
    pub stored_at: DateTime<Utc>,
    /// Expiration time, None = no expiration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// The serialized document
    pub payload: Value,
}

impl StoredRecord {
    // == Constructor ==
    /// Wraps `doc` for storage under `id`.
    pub fn new<T: CacheDocument>(
        doc: &T,
        id: &DocumentId,
        stored_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let payload = serde_json::to_value(doc).map_err(|e| {
            CacheError::EncodeFailure(format!("cannot serialize {}: {e}", T::DOC_TYPE))
        })?;

        Ok(Self {
            doc_type: T::DOC_TYPE.to_string(),
            key: id.key().to_string(),
            sub_key: id.sub_key().map(str::to_string),
            stored_at,
            expires_at,
            payload,
        })
    }

    /// Parses a raw store document.
    pub fn from_value(id: &str, value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| CacheError::DecodeFailure(format!("record '{id}' is not a cache record: {e}")))
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| CacheError::EncodeFailure(format!("cannot serialize record: {e}")))
    }

    // == Is Expired ==
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        ttl::is_expired(self.expires_at, now)
    }

    // == Into Document ==
    /// Materializes the payload as `T`, with identity taken from the record.
    pub fn into_document<T: CacheDocument>(self) -> Result<T> {
        let mut doc: T = serde_json::from_value(self.payload).map_err(|e| {
            CacheError::DecodeFailure(format!(
                "'{}' cannot be read as {}: {e}",
                self.key,
                T::DOC_TYPE
            ))
        })?;

        let meta = doc.meta_mut();
        meta.key = self.key;
        meta.sub_key = self.sub_key;
        Ok(doc)
    }

    /// Checks that the record agrees with the id it was read from.
    ///
    /// A sub-key or key that disagrees with the id means the record was
    /// written by something else; it is never silently accepted.
    pub fn verify_identity(&self, id: &DocumentId) -> Result<()> {
        if self.key != id.key() || self.sub_key.as_deref() != id.sub_key() {
            return Err(CacheError::DecodeFailure(format!(
                "record identity ({}, {:?}) does not match id '{id}'",
                self.key, self.sub_key
            )));
        }
        Ok(())
    }
}
