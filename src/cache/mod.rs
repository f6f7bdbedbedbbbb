//! Cache Module
//!
//! Provides the document cache: key codec, TTL policy, stored records and
//! the repository façade over a document store.

mod document;
mod key;
mod record;
mod repository;
mod stats;
pub mod ttl;


// Re-export public types
pub use document::{generate_key, BaseDocument, CacheDocument, DocumentMeta, JsonDocument};
pub use key::{DocumentId, SEPARATOR};
pub use record::StoredRecord;
pub use repository::CacheRepository;
pub use stats::CacheStats;
pub use ttl::{Clock, ManualClock, SystemClock};

// == Public Constants ==
/// Maximum allowed length in bytes of a key, sub-key or type name
pub const MAX_KEY_LENGTH: usize = 256;
