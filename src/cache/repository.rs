//! Cache Repository Module
//!
//! The cache façade: combines the key codec, the TTL policy and a
//! [`DocumentStore`] into set/get/remove for plain and specific entries,
//! clear and count.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::document::{generate_key, CacheDocument};
use crate::cache::key::DocumentId;
use crate::cache::record::StoredRecord;
use crate::cache::stats::{CacheStats, StatsRecorder};
use crate::cache::ttl::{self, Clock, SystemClock};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::store::DocumentStore;

// == Cache Repository ==
/// Document-store-backed cache with compound keys and TTL expiry.
///
/// Holds no cached state of its own: the store is the source of truth, so
/// the repository can be shared behind an `Arc` and called concurrently.
/// Every store call is bounded by the configured timeout; an elapsed
/// deadline surfaces as [`CacheError::StoreUnavailable`].
///
/// Reads never return an expired record. An expired record found by a read
/// is deleted on a spawned task so the read itself is not delayed.
pub struct CacheRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
    clock: Arc<dyn Clock>,
    op_timeout: Duration,
    stats: StatsRecorder,
}

impl CacheRepository {
    // == Constructors ==
    /// Opens a repository over `store`, creating the collection if needed.
    pub async fn open(store: Arc<dyn DocumentStore>, config: &Config) -> Result<Self> {
        Self::open_with_clock(store, config, Arc::new(SystemClock)).await
    }

    /// Opens a repository that reads time from `clock`.
    pub async fn open_with_clock(
        store: Arc<dyn DocumentStore>,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let repo = Self {
            store,
            collection: config.collection.clone(),
            clock,
            op_timeout: config.store_timeout(),
            stats: StatsRecorder::new(),
        };

        repo.call(
            "ensure_collection",
            repo.store.ensure_collection(&repo.collection),
        )
        .await?;
        info!(collection = %repo.collection, "Cache repository opened");

        Ok(repo)
    }

    /// Name of the collection this repository writes to.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    // == Plain Entries ==
    /// Stores `doc` as the plain entry for `key`, replacing any previous one.
    ///
    /// With a `ttl` the entry reads as absent once it has elapsed.
    pub async fn set<T: CacheDocument>(
        &self,
        doc: &T,
        key: &str,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let id = DocumentId::plain(key)?;
        self.write(doc, &id, ttl).await
    }

    /// Reads the plain entry for `key`. Absent and expired entries are `None`.
    pub async fn get<T: CacheDocument>(&self, key: &str) -> Result<Option<T>> {
        let id = DocumentId::plain(key)?;
        self.read(&id).await
    }

    /// Removes the plain entry for `key`. Specific entries are untouched.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let id = DocumentId::plain(key)?;
        self.delete(&id.to_string()).await
    }

    // == Specific Entries ==
    /// Stores `doc` as a specific entry of type `T` under `key`, without TTL.
    ///
    /// See [`set_specific_with_ttl`](Self::set_specific_with_ttl).
    pub async fn set_specific<T: CacheDocument>(
        &self,
        doc: &mut T,
        key: &str,
        sub_key: Option<&str>,
    ) -> Result<String> {
        self.set_specific_with_ttl(doc, key, sub_key, None).await
    }

    /// Stores `doc` as a specific entry of type `T` under `key`.
    ///
    /// The sub-key is `sub_key` if given, else the document's own sub-key,
    /// else a freshly generated one. The resolved key and sub-key are written
    /// back into `doc` and the sub-key is returned. Entries only replace each
    /// other when key, type and sub-key all match.
    pub async fn set_specific_with_ttl<T: CacheDocument>(
        &self,
        doc: &mut T,
        key: &str,
        sub_key: Option<&str>,
        ttl: Option<Duration>,
    ) -> Result<String> {
        let sub_key = match sub_key {
            Some(sub_key) => sub_key.to_string(),
            None => doc.sub_key().map_or_else(generate_key, str::to_string),
        };
        let id = DocumentId::specific(key, T::DOC_TYPE, &sub_key)?;

        let meta = doc.meta_mut();
        meta.key = key.to_string();
        meta.sub_key = Some(sub_key.clone());

        self.write(&*doc, &id, ttl).await?;
        Ok(sub_key)
    }

    /// Reads a specific entry of type `T` under `key`.
    ///
    /// With a sub-key, reads exactly that entry. Without one, returns the
    /// most recently stored live entry of type `T` under `key`.
    pub async fn get_specific<T: CacheDocument>(
        &self,
        key: &str,
        sub_key: Option<&str>,
    ) -> Result<Option<T>> {
        if let Some(sub_key) = sub_key {
            let id = DocumentId::specific(key, T::DOC_TYPE, sub_key)?;
            return self.read(&id).await;
        }

        let now = self.clock.now();
        let mut latest: Option<StoredRecord> = None;
        let mut saw_expired = false;
        for (id, value, record) in self.specific_records::<T>(key).await? {
            if record.is_expired(now) {
                saw_expired = true;
                self.evict_later(id, value);
                continue;
            }
            if latest
                .as_ref()
                .map_or(true, |best| record.stored_at > best.stored_at)
            {
                latest = Some(record);
            }
        }

        match latest {
            Some(record) => {
                let doc = record.into_document()?;
                self.stats.record_hit();
                Ok(Some(doc))
            }
            None if saw_expired => {
                self.stats.record_expiration();
                Ok(None)
            }
            None => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    /// Removes specific entries of type `T` under `key`.
    ///
    /// With a sub-key removes that entry, without one removes every entry of
    /// type `T` under `key`. Plain entries and other types are untouched.
    pub async fn remove_specific<T: CacheDocument>(
        &self,
        key: &str,
        sub_key: Option<&str>,
    ) -> Result<()> {
        if let Some(sub_key) = sub_key {
            let id = DocumentId::specific(key, T::DOC_TYPE, sub_key)?;
            return self.delete(&id.to_string()).await;
        }

        let prefix = DocumentId::specific_prefix(key, T::DOC_TYPE)?;
        let rows = self
            .call("scan", self.store.scan(&self.collection, Some(&prefix)))
            .await?;
        for (id, _) in rows {
            self.delete(&id).await?;
        }
        Ok(())
    }

    // == Collection ==
    /// Deletes every document in the collection.
    pub async fn clear(&self) -> Result<()> {
        self.call("delete_all", self.store.delete_all(&self.collection))
            .await?;
        info!(collection = %self.collection, "Cache cleared");
        Ok(())
    }

    /// Counts live documents of type `T`, plain and specific.
    ///
    /// Expired `T` records are evicted first so the store's count reflects
    /// only live ones.
    pub async fn get_doc_count<T: CacheDocument>(&self) -> Result<u64> {
        self.evict_expired(Some(T::DOC_TYPE)).await?;
        self.call(
            "count",
            self.store.count(&self.collection, Some(T::DOC_TYPE)),
        )
        .await
    }

    /// Deletes expired records, optionally only those of one type.
    ///
    /// Documents in the collection that are not cache records are left alone,
    /// and so is a record rewritten after the scan read it. Returns the number
    /// of records removed.
    pub async fn evict_expired(&self, doc_type: Option<&str>) -> Result<usize> {
        let now = self.clock.now();
        let rows = self
            .call("scan", self.store.scan(&self.collection, None))
            .await?;

        let mut removed = 0;
        for (id, value) in rows {
            let record = match StoredRecord::from_value(&id, value.clone()) {
                Ok(record) => record,
                Err(e) => {
                    debug!(id = %id, error = %e, "Skipping foreign document");
                    continue;
                }
            };
            if doc_type.is_some_and(|doc_type| record.doc_type != doc_type) {
                continue;
            }
            if !record.is_expired(now) {
                continue;
            }
            let deleted = self
                .call("delete_if", self.store.delete_if(&self.collection, &id, &value))
                .await?;
            if deleted {
                debug!(id = %id, "Expired document evicted");
                removed += 1;
            }
        }

        if removed > 0 {
            info!(collection = %self.collection, removed, "Evicted expired documents");
        }
        Ok(removed)
    }

    // == Stats ==
    /// Returns read statistics since the repository was opened.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Internals ==
    async fn write<T: CacheDocument>(
        &self,
        doc: &T,
        id: &DocumentId,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let now = self.clock.now();
        let record = StoredRecord::new(doc, id, now, ttl::compute_expiry(ttl, now))?;
        let id = id.to_string();

        self.call(
            "put",
            self.store.put(&self.collection, &id, record.to_value()?),
        )
        .await?;
        debug!(id = %id, doc_type = T::DOC_TYPE, ttl = ?ttl, "Document stored");
        Ok(())
    }

    async fn read<T: CacheDocument>(&self, id: &DocumentId) -> Result<Option<T>> {
        let raw_id = id.to_string();
        let Some(value) = self
            .call("get", self.store.get(&self.collection, &raw_id))
            .await?
        else {
            self.stats.record_miss();
            debug!(id = %raw_id, "Cache miss");
            return Ok(None);
        };

        let record = StoredRecord::from_value(&raw_id, value.clone())?;
        record.verify_identity(id)?;

        if record.is_expired(self.clock.now()) {
            self.stats.record_expiration();
            debug!(id = %raw_id, "Cache miss (expired)");
            self.evict_later(raw_id, value);
            return Ok(None);
        }

        let doc = record.into_document()?;
        self.stats.record_hit();
        Ok(Some(doc))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.call("delete", self.store.delete(&self.collection, id))
            .await?;
        debug!(id = %id, "Document removed");
        Ok(())
    }

    /// Scans every specific record of type `T` under `key`, keeping the raw
    /// document next to the parsed record.
    async fn specific_records<T: CacheDocument>(
        &self,
        key: &str,
    ) -> Result<Vec<(String, Value, StoredRecord)>> {
        let prefix = DocumentId::specific_prefix(key, T::DOC_TYPE)?;
        let rows = self
            .call("scan", self.store.scan(&self.collection, Some(&prefix)))
            .await?;

        rows.into_iter()
            .map(|(id, value)| {
                let record = StoredRecord::from_value(&id, value.clone())?;
                record.verify_identity(&DocumentId::parse(&id)?)?;
                Ok::<_, CacheError>((id, value, record))
            })
            .collect()
    }

    /// Deletes an expired record on a spawned task.
    ///
    /// `expired` is the document as the read saw it; the delete only applies
    /// while the store still holds exactly that version, so a write that
    /// lands in between survives.
    fn evict_later(&self, id: String, expired: Value) {
        let store = Arc::clone(&self.store);
        let collection = self.collection.clone();
        let op_timeout = self.op_timeout;

        tokio::spawn(async move {
            let evict = store.delete_if(&collection, &id, &expired);

            match tokio::time::timeout(op_timeout, evict).await {
                Ok(Ok(true)) => debug!(id = %id, "Expired document evicted"),
                Ok(Ok(false)) => {}
                Ok(Err(e)) => warn!(id = %id, error = %e, "Failed to evict expired document"),
                Err(_) => warn!(id = %id, "Timed out evicting expired document"),
            }
        });
    }

    /// Runs one store call under the operation timeout.
    async fn call<R>(&self, op: &'static str, fut: impl Future<Output = Result<R>>) -> Result<R> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.op_timeout.as_millis() as u64;
                warn!(op, timeout_ms, "Store operation timed out");
                Err(CacheError::StoreUnavailable(format!(
                    "{op} timed out after {timeout_ms}ms"
                )))
            }
        }
    }
}
