//! Issued-key index.
//!
//! Remembers the live keys the cache service has written, grouped by
//! category prefix, so bulk invalidation still works on stores that lack a
//! native pattern delete. Each key carries its expiry; expired keys are
//! dropped whenever their category is written or scanned.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::store::glob_match;
use crate::cache::CacheKey;

/// Key -> expiry (Unix milliseconds).
type Keys = BTreeMap<String, u64>;

#[derive(Debug, Default)]
pub struct KeyIndex {
    by_category: Mutex<HashMap<String, Keys>>,
}

fn category_of(key: &str) -> &str {
    key.split_once(':').map_or(key, |(prefix, _)| prefix)
}

fn prune(index: &mut HashMap<String, Keys>, now: u64) -> usize {
    let mut dropped = 0;
    for keys in index.values_mut() {
        let before = keys.len();
        keys.retain(|_, expires_at| *expires_at > now);
        dropped += before - keys.len();
    }
    index.retain(|_, keys| !keys.is_empty());
    dropped
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Keys>> {
        // Entries are plain strings; a panic elsewhere cannot leave them torn
        self.by_category.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `key` as live for `ttl`, dropping expired keys of the same
    /// category.
    pub fn record(&self, key: &CacheKey, ttl: Duration) {
        let now = current_timestamp_ms();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

        let mut index = self.lock();
        let keys = index.entry(key.category().to_string()).or_default();
        keys.retain(|_, expires_at| *expires_at > now);
        keys.insert(key.as_str().to_string(), now.saturating_add(ttl_ms));
    }

    pub fn forget(&self, key: &str) {
        let category = category_of(key);
        let mut index = self.lock();
        if let Some(keys) = index.get_mut(category) {
            keys.remove(key);
            if keys.is_empty() {
                index.remove(category);
            }
        }
    }

    /// Live indexed keys matching `pattern`. They stay indexed until the
    /// caller forgets them.
    pub fn matching(&self, pattern: &str) -> Vec<String> {
        let mut index = self.lock();
        prune(&mut index, current_timestamp_ms());

        index
            .values()
            .flat_map(|keys| keys.keys())
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect()
    }

    pub fn forget_matching(&self, pattern: &str) {
        let mut index = self.lock();
        for keys in index.values_mut() {
            keys.retain(|key, _| !glob_match(pattern, key));
        }
        index.retain(|_, keys| !keys.is_empty());
    }

    /// Drops every expired key, returning how many were removed.
    pub fn prune_expired(&self) -> usize {
        prune(&mut self.lock(), current_timestamp_ms())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of indexed keys, expired ones included until pruned.
    pub fn len(&self) -> usize {
        self.lock().values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
