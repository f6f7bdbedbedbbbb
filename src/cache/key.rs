//! Key Codec Module
//!
//! Maps a logical key, a payload type name and an optional sub-key to the
//! physical document id, and back.
//!
//! Plain entries use the key itself. Specific entries use
//! `key|type|sub_key`. Since no component may contain the separator, a plain
//! id never equals a specific id, and specific ids of different types never
//! collide.

use std::fmt;

use crate::cache::MAX_KEY_LENGTH;
use crate::error::{CacheError, Result};

/// Separator between id components.
pub const SEPARATOR: char = '|';

// == Document Id ==
/// A decoded physical document id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentId {
    /// Entry addressed by key alone
    Plain { key: String },
    /// Entry addressed by key, payload type and sub-key
    Specific {
        key: String,
        doc_type: String,
        sub_key: String,
    },
}

impl DocumentId {
    // == Constructors ==
    /// Builds the id of a plain entry.
    pub fn plain(key: &str) -> Result<Self> {
        validate_component("key", key)?;
        Ok(Self::Plain {
            key: key.to_string(),
        })
    }

    /// Builds the id of a specific entry.
    pub fn specific(key: &str, doc_type: &str, sub_key: &str) -> Result<Self> {
        validate_component("key", key)?;
        validate_component("type name", doc_type)?;
        validate_component("sub-key", sub_key)?;
        Ok(Self::Specific {
            key: key.to_string(),
            doc_type: doc_type.to_string(),
            sub_key: sub_key.to_string(),
        })
    }

    /// Id prefix shared by every specific entry of `doc_type` under `key`.
    pub fn specific_prefix(key: &str, doc_type: &str) -> Result<String> {
        validate_component("key", key)?;
        validate_component("type name", doc_type)?;
        Ok(format!("{key}{SEPARATOR}{doc_type}{SEPARATOR}"))
    }

    // == Parse ==
    /// Decodes a physical id.
    ///
    /// Fails with `DecodeFailure` when the id has two segments, more than
    /// three, or any empty segment.
    pub fn parse(id: &str) -> Result<Self> {
        let parts: Vec<&str> = id.split(SEPARATOR).collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(CacheError::DecodeFailure(format!(
                "malformed document id '{id}': empty segment"
            )));
        }

        match parts.as_slice() {
            [key] => Ok(Self::Plain {
                key: key.to_string(),
            }),
            [key, doc_type, sub_key] => Ok(Self::Specific {
                key: key.to_string(),
                doc_type: doc_type.to_string(),
                sub_key: sub_key.to_string(),
            }),
            _ => Err(CacheError::DecodeFailure(format!(
                "malformed document id '{id}': expected 1 or 3 segments, found {}",
                parts.len()
            ))),
        }
    }

    // == Accessors ==
    pub fn key(&self) -> &str {
        match self {
            Self::Plain { key } | Self::Specific { key, .. } => key,
        }
    }

    pub fn sub_key(&self) -> Option<&str> {
        match self {
            Self::Plain { .. } => None,
            Self::Specific { sub_key, .. } => Some(sub_key),
        }
    }

    pub fn doc_type(&self) -> Option<&str> {
        match self {
            Self::Plain { .. } => None,
            Self::Specific { doc_type, .. } => Some(doc_type),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain { key } => f.write_str(key),
            Self::Specific {
                key,
                doc_type,
                sub_key,
            } => write!(f, "{key}{SEPARATOR}{doc_type}{SEPARATOR}{sub_key}"),
        }
    }
}

// == Validation ==
/// Checks one id component.
///
/// Leading underscores are reserved by CouchDB for system documents.
fn validate_component(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CacheError::InvalidKey(format!("{what} cannot be empty")));
    }
    if value.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "{what} exceeds maximum length of {MAX_KEY_LENGTH} bytes"
        )));
    }
    if value.contains(SEPARATOR) {
        return Err(CacheError::InvalidKey(format!(
            "{what} '{value}' contains reserved character '{SEPARATOR}'"
        )));
    }
    if value.starts_with('_') {
        return Err(CacheError::InvalidKey(format!(
            "{what} '{value}' starts with reserved character '_'"
        )));
    }
    Ok(())
}
