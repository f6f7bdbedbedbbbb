//! Integration Tests for the Cache Repository
//!
//! Exercises the public repository contract against the in-memory store:
//! plain and specific entries, clear, count, TTL expiry and store failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_test::{assert_err, assert_ok};

use couch_cache::cache::{BaseDocument, ManualClock};
use couch_cache::{
    CacheDocument, CacheError, CacheRepository, Config, DocumentMeta, DocumentStore, MemoryStore,
    Result,
};

// == Test Payloads ==

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Car {
    #[serde(flatten)]
    meta: DocumentMeta,
    maker: String,
}

impl Car {
    fn new(maker: &str) -> Self {
        Self {
            meta: DocumentMeta::new(None),
            maker: maker.to_string(),
        }
    }
}

impl CacheDocument for Car {
    const DOC_TYPE: &'static str = "Car";

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Boat {
    #[serde(flatten)]
    meta: DocumentMeta,
    length_m: u32,
}

impl CacheDocument for Boat {
    const DOC_TYPE: &'static str = "Boat";

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

// == Helper Functions ==

struct Fixture {
    repo: CacheRepository,
    clock: ManualClock,
}

async fn fixture() -> Fixture {
    let clock = ManualClock::default();
    let repo = CacheRepository::open_with_clock(
        Arc::new(MemoryStore::new()),
        &Config::default(),
        Arc::new(clock.clone()),
    )
    .await
    .unwrap();
    Fixture { repo, clock }
}

// == Plain Entries ==

#[tokio::test]
async fn test_set_and_get() {
    let f = fixture().await;
    let doc = BaseDocument::new(None);

    assert_ok!(f.repo.set(&doc, doc.key(), None).await);
    let doc_db: BaseDocument = f.repo.get(doc.key()).await.unwrap().unwrap();

    assert_eq!(doc.key(), doc_db.key());
    assert_eq!(doc_db.sub_key(), None);
}

#[tokio::test]
async fn test_set_and_get_typed_payload() {
    let f = fixture().await;
    let car = Car::new("Volvo");

    f.repo.set(&car, car.key(), None).await.unwrap();
    let car_db: Car = f.repo.get(car.key()).await.unwrap().unwrap();

    assert_eq!(car_db.key(), car.key());
    assert_eq!(car_db.maker, "Volvo");
}

#[tokio::test]
async fn test_remove() {
    let f = fixture().await;
    let doc = BaseDocument::new(None);
    f.repo.set(&doc, doc.key(), None).await.unwrap();

    f.repo.remove(doc.key()).await.unwrap();

    let doc_db: Option<BaseDocument> = f.repo.get(doc.key()).await.unwrap();
    assert!(doc_db.is_none());
}

#[tokio::test]
async fn test_remove_twice_is_not_an_error() {
    let f = fixture().await;
    let doc = BaseDocument::new(None);
    f.repo.set(&doc, doc.key(), None).await.unwrap();

    assert_ok!(f.repo.remove(doc.key()).await);
    assert_ok!(f.repo.remove(doc.key()).await);
    assert_ok!(f.repo.remove("never-set").await);
}

// == Specific Entries ==

#[tokio::test]
async fn test_set_and_get_specific() {
    let f = fixture().await;
    let mut car = Car::new("Saab");
    let key = car.key().to_string();

    let sub_key = f.repo.set_specific(&mut car, &key, None).await.unwrap();
    let car_db: Car = f
        .repo
        .get_specific(&key, Some(&sub_key))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(car.key(), car_db.key());
    assert_eq!(car.sub_key(), car_db.sub_key());
    assert_eq!(car.maker, car_db.maker);
}

#[tokio::test]
async fn test_two_specific_entries_coexist() {
    let f = fixture().await;
    let mut volvo = Car::new("Volvo");
    let mut saab = Car::new("Saab");
    let (volvo_key, saab_key) = (volvo.key().to_string(), saab.key().to_string());

    f.repo.set_specific(&mut volvo, &volvo_key, None).await.unwrap();
    f.repo.set_specific(&mut saab, &saab_key, None).await.unwrap();

    let volvo_db: Car = f.repo.get_specific(&volvo_key, None).await.unwrap().unwrap();
    let saab_db: Car = f.repo.get_specific(&saab_key, None).await.unwrap().unwrap();
    assert_eq!(volvo_db, volvo);
    assert_eq!(saab_db, saab);
}

#[tokio::test]
async fn test_sub_keys_isolate_entries_under_one_key() {
    let f = fixture().await;
    let mut red = Car::new("Volvo");
    let mut blue = Car::new("Saab");

    f.repo.set_specific(&mut red, "garage", Some("red")).await.unwrap();
    f.repo.set_specific(&mut blue, "garage", Some("blue")).await.unwrap();

    let red_db: Car = f.repo.get_specific("garage", Some("red")).await.unwrap().unwrap();
    let blue_db: Car = f.repo.get_specific("garage", Some("blue")).await.unwrap().unwrap();
    assert_eq!(red_db.maker, "Volvo");
    assert_eq!(blue_db.maker, "Saab");

    f.repo
        .remove_specific::<Car>("garage", Some("red"))
        .await
        .unwrap();

    assert!(f
        .repo
        .get_specific::<Car>("garage", Some("red"))
        .await
        .unwrap()
        .is_none());
    assert!(f
        .repo
        .get_specific::<Car>("garage", Some("blue"))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_plain_and_specific_entries_are_distinct() {
    let f = fixture().await;
    let plain = Car::new("Plain");
    let mut specific = Car::new("Specific");
    let key = plain.key().to_string();

    f.repo.set(&plain, &key, None).await.unwrap();
    f.repo.set_specific(&mut specific, &key, None).await.unwrap();

    // Removing the specific entry leaves the plain one
    f.repo.remove_specific::<Car>(&key, None).await.unwrap();
    let plain_db: Car = f.repo.get(&key).await.unwrap().unwrap();
    assert_eq!(plain_db.maker, "Plain");
    assert!(f.repo.get_specific::<Car>(&key, None).await.unwrap().is_none());

    // And the other way round
    f.repo.set_specific(&mut specific, &key, None).await.unwrap();
    f.repo.remove(&key).await.unwrap();
    assert!(f.repo.get::<Car>(&key).await.unwrap().is_none());
    let specific_db: Car = f.repo.get_specific(&key, None).await.unwrap().unwrap();
    assert_eq!(specific_db.maker, "Specific");
}

#[tokio::test]
async fn test_remove_specific_is_scoped_to_type() {
    let f = fixture().await;
    let mut car = Car::new("Volvo");
    let mut boat = Boat {
        meta: DocumentMeta::new(None),
        length_m: 12,
    };

    f.repo.set_specific(&mut car, "harbour", Some("one")).await.unwrap();
    f.repo.set_specific(&mut boat, "harbour", Some("one")).await.unwrap();

    f.repo.remove_specific::<Car>("harbour", None).await.unwrap();

    assert!(f
        .repo
        .get_specific::<Car>("harbour", Some("one"))
        .await
        .unwrap()
        .is_none());
    let boat_db: Boat = f
        .repo
        .get_specific("harbour", Some("one"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(boat_db.length_m, 12);

    // Idempotent
    assert_ok!(f.repo.remove_specific::<Car>("harbour", None).await);
    assert_ok!(f.repo.remove_specific::<Car>("harbour", Some("one")).await);
}

// == Collection ==

#[tokio::test]
async fn test_clear_and_count() {
    let f = fixture().await;
    let mut volvo = Car::new("Volvo");
    let mut saab = Car::new("Saab");
    let doc = BaseDocument::new(None);
    let (volvo_key, saab_key) = (volvo.key().to_string(), saab.key().to_string());

    f.repo.set_specific(&mut volvo, &volvo_key, None).await.unwrap();
    f.repo.set_specific(&mut saab, &saab_key, None).await.unwrap();
    f.repo.set(&doc, doc.key(), None).await.unwrap();

    assert_eq!(f.repo.get_doc_count::<Car>().await.unwrap(), 2);
    assert_eq!(f.repo.get_doc_count::<BaseDocument>().await.unwrap(), 1);

    f.repo.clear().await.unwrap();

    assert_eq!(f.repo.get_doc_count::<Car>().await.unwrap(), 0);
    assert_eq!(f.repo.get_doc_count::<BaseDocument>().await.unwrap(), 0);
}

#[tokio::test]
async fn test_count_excludes_expired() {
    let f = fixture().await;
    let short = Car::new("Short");
    let long = Car::new("Long");

    f.repo
        .set(&short, short.key(), Some(Duration::from_secs(5)))
        .await
        .unwrap();
    f.repo.set(&long, long.key(), None).await.unwrap();
    assert_eq!(f.repo.get_doc_count::<Car>().await.unwrap(), 2);

    f.clock.advance(Duration::from_secs(6));
    assert_eq!(f.repo.get_doc_count::<Car>().await.unwrap(), 1);
}

// == TTL ==

#[tokio::test]
async fn test_ttl_expiry() {
    let f = fixture().await;
    let doc = BaseDocument::new(None);

    f.repo
        .set(&doc, doc.key(), Some(Duration::from_secs(5)))
        .await
        .unwrap();

    f.clock.advance(Duration::from_secs(1));
    let doc_db: Option<BaseDocument> = f.repo.get(doc.key()).await.unwrap();
    assert_eq!(doc_db.map(|d| d.meta.key), Some(doc.key().to_string()));

    f.clock.advance(Duration::from_secs(5));
    let doc_db: Option<BaseDocument> = f.repo.get(doc.key()).await.unwrap();
    assert!(doc_db.is_none());
}

#[tokio::test]
async fn test_ttl_expiry_specific() {
    let f = fixture().await;
    let mut car = Car::new("Volvo");
    let key = car.key().to_string();

    let sub_key = f
        .repo
        .set_specific_with_ttl(&mut car, &key, None, Some(Duration::from_secs(5)))
        .await
        .unwrap();

    f.clock.advance(Duration::from_secs(1));
    assert!(f
        .repo
        .get_specific::<Car>(&key, Some(&sub_key))
        .await
        .unwrap()
        .is_some());

    f.clock.advance(Duration::from_secs(5));
    assert!(f
        .repo
        .get_specific::<Car>(&key, Some(&sub_key))
        .await
        .unwrap()
        .is_none());
    assert!(f.repo.get_specific::<Car>(&key, None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_set_resets_ttl() {
    let f = fixture().await;
    let doc = BaseDocument::new(None);

    f.repo
        .set(&doc, doc.key(), Some(Duration::from_secs(5)))
        .await
        .unwrap();
    f.clock.advance(Duration::from_secs(4));
    f.repo.set(&doc, doc.key(), None).await.unwrap();
    f.clock.advance(Duration::from_secs(10));

    assert!(f.repo.get::<BaseDocument>(doc.key()).await.unwrap().is_some());
}

// == Errors ==

#[tokio::test]
async fn test_shape_mismatch_is_decode_failure() {
    let f = fixture().await;
    let doc = BaseDocument::new(None);
    f.repo.set(&doc, doc.key(), None).await.unwrap();

    // A Car needs a `maker`, the stored payload has none
    let result = f.repo.get::<Car>(doc.key()).await;
    assert!(matches!(result, Err(CacheError::DecodeFailure(_))));
}

/// A store whose every call fails as if the network were down.
struct UnreachableStore;

#[async_trait]
impl DocumentStore for UnreachableStore {
    async fn ensure_collection(&self, _: &str) -> Result<()> {
        Ok(())
    }

    async fn put(&self, _: &str, _: &str, _: Value) -> Result<()> {
        Err(unreachable_error())
    }

    async fn get(&self, _: &str, _: &str) -> Result<Option<Value>> {
        Err(unreachable_error())
    }

    async fn delete(&self, _: &str, _: &str) -> Result<()> {
        Err(unreachable_error())
    }

    async fn delete_if(&self, _: &str, _: &str, _: &Value) -> Result<bool> {
        Err(unreachable_error())
    }

    async fn delete_all(&self, _: &str) -> Result<()> {
        Err(unreachable_error())
    }

    async fn count(&self, _: &str, _: Option<&str>) -> Result<u64> {
        Err(unreachable_error())
    }

    async fn scan(&self, _: &str, _: Option<&str>) -> Result<Vec<(String, Value)>> {
        Err(unreachable_error())
    }
}

fn unreachable_error() -> CacheError {
    CacheError::StoreUnavailable("connection refused".to_string())
}

#[tokio::test]
async fn test_store_failure_surfaces_as_store_unavailable() {
    let repo = CacheRepository::open(Arc::new(UnreachableStore), &Config::default())
        .await
        .unwrap();
    let doc = BaseDocument::new(None);

    let set = repo.set(&doc, doc.key(), None).await;
    assert!(matches!(set, Err(CacheError::StoreUnavailable(_))));
    let get = repo.get::<BaseDocument>(doc.key()).await;
    assert!(matches!(get, Err(CacheError::StoreUnavailable(_))));
    assert_err!(repo.remove(doc.key()).await);
    assert_err!(repo.clear().await);
    assert_err!(repo.get_doc_count::<BaseDocument>().await);
}

/// A store that never answers within any reasonable deadline.
struct StalledStore;

#[async_trait]
impl DocumentStore for StalledStore {
    async fn ensure_collection(&self, _: &str) -> Result<()> {
        Ok(())
    }

    async fn put(&self, _: &str, _: &str, _: Value) -> Result<()> {
        stall().await
    }

    async fn get(&self, _: &str, _: &str) -> Result<Option<Value>> {
        stall().await
    }

    async fn delete(&self, _: &str, _: &str) -> Result<()> {
        stall().await
    }

    async fn delete_if(&self, _: &str, _: &str, _: &Value) -> Result<bool> {
        stall().await
    }

    async fn delete_all(&self, _: &str) -> Result<()> {
        stall().await
    }

    async fn count(&self, _: &str, _: Option<&str>) -> Result<u64> {
        stall().await
    }

    async fn scan(&self, _: &str, _: Option<&str>) -> Result<Vec<(String, Value)>> {
        stall().await
    }
}

async fn stall<T: Send>() -> Result<T> {
    tokio::time::sleep(Duration::from_secs(30)).await;
    Err(CacheError::StoreUnavailable("stalled".to_string()))
}

#[tokio::test]
async fn test_timeout_surfaces_as_store_unavailable() {
    let config = Config {
        store_timeout_ms: 20,
        ..Config::default()
    };
    let repo = CacheRepository::open(Arc::new(StalledStore), &config)
        .await
        .unwrap();
    let doc = BaseDocument::new(None);

    let started = std::time::Instant::now();
    let result = repo.set(&doc, doc.key(), None).await;

    assert!(matches!(
        result,
        Err(CacheError::StoreUnavailable(ref msg)) if msg.contains("timed out")
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_concurrent_writers_on_different_keys() {
    let f = fixture().await;
    let repo = Arc::new(f.repo);

    let mut handles = Vec::new();
    for i in 0..20 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            let key = format!("car-{i}");
            let car = Car {
                meta: DocumentMeta::new(Some(key.clone())),
                maker: format!("maker-{i}"),
            };
            repo.set(&car, &key, None).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(repo.get_doc_count::<Car>().await.unwrap(), 20);
    let car: Car = repo.get("car-7").await.unwrap().unwrap();
    assert_eq!(car.maker, "maker-7");
}
