//! Cache Store Module
//!
//! The key-value store contract the cache layer depends on, and the
//! in-process backend used by the server.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::StoreError;

// == Key-Value Store ==
/// A shared cache backing store with per-entry expiry.
///
/// Single-key writes are atomic; nothing else is promised. Absent and
/// expired entries both read as `Ok(None)`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;

    /// Whether `delete_pattern` is native. When it is not, the cache service
    /// keeps an index of issued keys to purge by pattern.
    fn supports_pattern_delete(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;

    /// Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Removes every key matching a glob (`*` any run, `?` one character).
    ///
    /// Backends without native support answer `StoreError::Unsupported`
    /// and report `false` from `supports_pattern_delete`.
    async fn delete_pattern(&self, pattern: &str) -> Result<usize, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;

    /// Number of live entries.
    async fn len(&self) -> Result<usize, StoreError>;
}

// == Memory Store ==
/// In-memory store with TTL expiry and glob deletion.
///
/// Expired entries are dropped lazily on read and by the periodic sweep.
/// There is no eviction: once `max_entries` live entries exist, new keys are
/// refused until something expires or is deleted.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl MemoryStore {
    /// Creates an empty store holding at most `max_entries` live entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    /// Remaining lifetime of a live key.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::ttl_remaining)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it so it does not linger until the next sweep
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(StoreError::Rejected(format!(
                "key must be 1..={} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(StoreError::Rejected(format!(
                "value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let mut entries = self.entries.write().await;
        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            entries.retain(|_, entry| !entry.is_expired());
            if entries.len() >= self.max_entries {
                return Err(StoreError::Full(self.max_entries));
            }
        }

        entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(key)
            .is_some_and(|entry| !entry.is_expired()))
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !glob_match(pattern, key));
        Ok(before - entries.len())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.values().filter(|entry| !entry.is_expired()).count())
    }
}

// == Glob Matching ==
/// Matches `key` against a glob where `*` spans any run of characters and
/// `?` exactly one. Everything else is literal.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p).copied() {
            Some('*') => {
                backtrack = Some((p, k));
                p += 1;
            }
            Some(c) if c == '?' || c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                Some((star_p, star_k)) => {
                    p = star_p + 1;
                    k = star_k + 1;
                    backtrack = Some((star_p, star_k + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
