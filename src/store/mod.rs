//! Document Store Module
//!
//! The narrow interface the cache consumes from its document database.
//! A CouchDB client, or any other JSON document store, plugs in by
//! implementing [`DocumentStore`].

mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use memory::MemoryStore;

/// Field of a stored record that `count`'s type filter matches against.
pub const TYPE_FIELD: &str = "doc_type";

/// Create/read/update/delete of JSON documents by id within named collections.
///
/// Implementations report transport failures as
/// [`CacheError::StoreUnavailable`](crate::error::CacheError::StoreUnavailable)
/// and revision rejections as
/// [`CacheError::Conflict`](crate::error::CacheError::Conflict).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates the collection if it does not exist yet.
    async fn ensure_collection(&self, collection: &str) -> Result<()>;

    /// Writes `document` under `id`, replacing any previous version.
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<()>;

    /// Reads the document stored under `id`.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Deletes the document under `id`. Deleting a missing id succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Deletes the document under `id` only if it still equals `expected`.
    ///
    /// The comparison and the removal are one atomic step (CouchDB's
    /// `DELETE ?rev=`). Returns whether the document was removed; a missing
    /// or changed document is left alone and yields `false`.
    async fn delete_if(&self, collection: &str, id: &str, expected: &Value) -> Result<bool>;

    /// Deletes every document in the collection.
    async fn delete_all(&self, collection: &str) -> Result<()>;

    /// Counts documents, optionally only those whose [`TYPE_FIELD`] equals `type_filter`.
    async fn count(&self, collection: &str, type_filter: Option<&str>) -> Result<u64>;

    /// Lists `(id, document)` pairs in id order, optionally restricted to ids
    /// starting with `id_prefix`.
    async fn scan(&self, collection: &str, id_prefix: Option<&str>)
        -> Result<Vec<(String, Value)>>;
}
