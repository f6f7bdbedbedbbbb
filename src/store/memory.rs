//! In-memory Document Store
//!
//! A process-local [`DocumentStore`] used by the bundled server and by tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DocumentStore, TYPE_FIELD};
use crate::error::Result;

type Collection = BTreeMap<String, Value>;

// == Memory Store ==
/// Collections of JSON documents kept in ordered maps behind a tokio RwLock.
///
/// Cloning is cheap and clones share the same documents. Writes are
/// last-write-wins. Operations on a collection that was never created
/// behave as on an empty one.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_collection(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn delete_if(&self, collection: &str, id: &str, expected: &Value) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };

        if docs.get(id) != Some(expected) {
            return Ok(false);
        }
        docs.remove(id);
        Ok(true)
    }

    async fn delete_all(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.clear();
        }
        Ok(())
    }

    async fn count(&self, collection: &str, type_filter: Option<&str>) -> Result<u64> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(0);
        };

        let count = match type_filter {
            Some(doc_type) => docs
                .values()
                .filter(|doc| doc.get(TYPE_FIELD).and_then(Value::as_str) == Some(doc_type))
                .count(),
            None => docs.len(),
        };
        Ok(count as u64)
    }

    async fn scan(
        &self,
        collection: &str,
        id_prefix: Option<&str>,
    ) -> Result<Vec<(String, Value)>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let prefix = id_prefix.unwrap_or("");
        Ok(docs
            .range(prefix.to_string()..)
            .take_while(|(id, _)| id.starts_with(prefix))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect())
    }
}
