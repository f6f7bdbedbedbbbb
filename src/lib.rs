//! Couch Cache - A document-store-backed cache
//!
//! Stores typed documents in a document database under plain keys or
//! compound (key, type, sub-key) ids, with TTL expiry enforced on read.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheDocument, CacheRepository, DocumentMeta};
pub use config::Config;
pub use error::{CacheError, Result};
pub use store::{DocumentStore, MemoryStore};
pub use tasks::spawn_cleanup_task;
