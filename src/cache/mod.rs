//! Cache Module
//!
//! Cache-aside layer in front of the upstream movie API and the catalog:
//! key derivation, TTL policy, the cache service, invalidation and the
//! in-memory key-value store backing it all.

mod entry;
mod index;
pub mod invalidation;
pub mod key;
mod service;
mod stats;
mod store;
pub mod ttl;


// Re-export public types
pub use entry::CacheEntry;
pub use index::KeyIndex;
pub use invalidation::{InvalidationScope, Invalidator};
pub use key::{
    build_key, genres_key, movie_details_key, user_favorites_key, CacheKey, KeyParams, ParamValue,
};
pub use service::{CacheService, DEFAULT_STORE_TIMEOUT};
pub use stats::{CacheMetrics, CacheStats};
pub use store::{glob_match, KeyValueStore, MemoryStore};
pub use ttl::{Category, TtlPolicy};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 4 * 1024 * 1024; // 4 MB
