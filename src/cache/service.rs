//! Cache-Aside Service
//!
//! Generic get / set / delete / get-or-compute over a `KeyValueStore`.
//! Store failures never escape: reads degrade to a miss, writes to a no-op,
//! and both are logged and counted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheMetrics, CacheStats, KeyIndex, KeyValueStore};
use crate::error::StoreError;

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

enum Lookup<T> {
    Hit(T),
    Miss,
    Failed,
}

// == Cache Service ==
/// Cache-aside operations shared by the cached fetcher, the API handlers and
/// the invalidation router. Cheap to clone.
#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn KeyValueStore>,
    timeout: Duration,
    metrics: Arc<CacheMetrics>,
    index: Arc<KeyIndex>,
    /// Whether writes are recorded in `index`
    indexed: bool,
}

impl CacheService {
    /// Wraps `store`, bounding every call by `timeout`.
    ///
    /// Issued keys are only indexed when the store has no native pattern
    /// delete.
    pub fn new(store: Arc<dyn KeyValueStore>, timeout: Duration) -> Self {
        let indexed = !store.supports_pattern_delete();
        Self {
            store,
            timeout,
            metrics: Arc::new(CacheMetrics::new()),
            index: Arc::new(KeyIndex::new()),
            indexed,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot()
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Live keys written through this service that have not been deleted
    /// since. Always empty for stores with a native pattern delete.
    pub fn index(&self) -> &KeyIndex {
        &self.index
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }

    fn report(&self, op: &'static str, key: &str, err: &StoreError) {
        self.metrics.record_error();
        warn!(
            op,
            key,
            backend = self.store.backend_name(),
            error = %err,
            "cache store error"
        );
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Lookup<T> {
        match self.bounded(self.store.get(key.as_str())).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.metrics.record_hit();
                    debug!(key = %key, category = key.category(), "cache hit");
                    Lookup::Hit(value)
                }
                Err(err) => {
                    // Undecodable payloads are treated as absent
                    self.metrics.record_error();
                    warn!(key = %key, error = %err, "discarding undecodable cache entry");
                    Lookup::Failed
                }
            },
            Ok(None) => {
                self.metrics.record_miss();
                debug!(key = %key, category = key.category(), "cache miss");
                Lookup::Miss
            }
            Err(err) => {
                self.report("get", key.as_str(), &err);
                Lookup::Failed
            }
        }
    }

    // == Get ==
    /// Cached value for `key`, or `None` when absent, expired or unreadable.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        match self.lookup(key).await {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Failed => None,
        }
    }

    // == Set ==
    /// Stores `value` for `ttl`. Values serializing to `null` are never
    /// stored. Returns whether the store accepted the write.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T, ttl: Duration) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                self.metrics.record_error();
                warn!(key = %key, error = %err, "cache value could not be serialized");
                return false;
            }
        };

        if raw == "null" {
            debug!(key = %key, "skipping empty cache value");
            return false;
        }

        match self.bounded(self.store.set(key.as_str(), raw, ttl)).await {
            Ok(()) => {
                self.metrics.record_write();
                if self.indexed {
                    self.index.record(key, ttl);
                }
                debug!(key = %key, ttl_secs = ttl.as_secs(), "cached value");
                true
            }
            Err(err) => {
                self.report("set", key.as_str(), &err);
                false
            }
        }
    }

    // == Delete ==
    /// Removes `key`. Returns whether a live entry was removed; a failed
    /// store call reports `false` and leaves the key indexed.
    pub async fn delete(&self, key: &CacheKey) -> bool {
        match self.bounded(self.store.delete(key.as_str())).await {
            Ok(removed) => {
                self.index.forget(key.as_str());
                removed
            }
            Err(err) => {
                self.report("delete", key.as_str(), &err);
                false
            }
        }
    }

    // == Get Or Compute ==
    /// The cache-aside primitive.
    ///
    /// On a hit the cached value is returned and `compute` is dropped
    /// uncalled. Otherwise `compute` runs exactly once; an `Ok` value is
    /// stored under `key` for `ttl` before being returned, an `Err` is
    /// returned as-is and never stored. Store failures never change the
    /// returned value. Concurrent callers on the same key may each compute.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Lookup::Hit(value) = self.lookup(key).await {
            return Ok(value);
        }

        let value = compute().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }

    // == Purge ==
    /// Deletes every key matching `pattern`, falling back to the issued-key
    /// index when the store has no pattern delete. Returns the number of
    /// keys removed; failures are reported and count as zero.
    pub async fn purge(&self, pattern: &str) -> usize {
        match self.bounded(self.store.delete_pattern(pattern)).await {
            Ok(removed) => {
                self.index.forget_matching(pattern);
                removed
            }
            Err(StoreError::Unsupported(_)) => self.purge_indexed(pattern).await,
            Err(err) => {
                self.report("delete_pattern", pattern, &err);
                0
            }
        }
    }

    async fn purge_indexed(&self, pattern: &str) -> usize {
        let mut removed = 0;
        for key in self.index.matching(pattern) {
            // Keys stay indexed until the store confirms the delete
            match self.bounded(self.store.delete(&key)).await {
                Ok(deleted) => {
                    self.index.forget(&key);
                    removed += usize::from(deleted);
                }
                Err(err) => self.report("delete", &key, &err),
            }
        }
        removed
    }

    // == Clear ==
    /// Drops every entry in the store.
    pub async fn clear(&self) -> bool {
        match self.bounded(self.store.clear()).await {
            Ok(()) => {
                self.index.clear();
                true
            }
            Err(err) => {
                self.report("clear", "*", &err);
                false
            }
        }
    }

    /// Live entries in the store, if it can answer.
    pub async fn entry_count(&self) -> Option<usize> {
        match self.bounded(self.store.len()).await {
            Ok(count) => Some(count),
            Err(err) => {
                self.report("len", "*", &err);
                None
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{build_key, genres_key, Category, KeyParams, MemoryStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    fn memory_service() -> CacheService {
        CacheService::new(Arc::new(MemoryStore::new(100)), DEFAULT_STORE_TIMEOUT)
    }

    /// Store that fails every call.
    struct DownStore;

    #[async_trait]
    impl KeyValueStore for DownStore {
        fn backend_name(&self) -> &'static str {
            "down"
        }
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn delete_pattern(&self, _pattern: &str) -> Result<usize, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn len(&self) -> Result<usize, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    /// Store whose reads never complete.
    struct HangingStore;

    #[async_trait]
    impl KeyValueStore for HangingStore {
        fn backend_name(&self) -> &'static str {
            "hanging"
        }
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            std::future::pending().await
        }
        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
            std::future::pending().await
        }
        async fn delete_pattern(&self, _pattern: &str) -> Result<usize, StoreError> {
            std::future::pending().await
        }
        async fn clear(&self) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn len(&self) -> Result<usize, StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_get_or_compute_computes_once() {
        let service = memory_service();
        let key = build_key(Category::PopularMovies, &KeyParams::new().with("page", 1i64));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<Vec<i64>, ()> = service
                .get_or_compute(&key, TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await;
            assert_eq!(value, Ok(vec![1, 2, 3]));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = service.stats();
        assert_eq!((stats.hits, stats.misses, stats.writes), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let service = memory_service();
        let key = genres_key();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<Vec<i64>, &str> = service
                .get_or_compute(&key, TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("upstream down")
                })
                .await;
            assert_eq!(value, Err("upstream down"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.stats().writes, 0);
    }

    #[tokio::test]
    async fn test_absent_values_are_not_cached() {
        let service = memory_service();
        let key = genres_key();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<Option<String>, ()> = service
                .get_or_compute(&key, TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                })
                .await;
            assert_eq!(value, Ok(None));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_collections_are_cached() {
        let service = memory_service();
        let key = genres_key();

        assert!(service.set(&key, &Vec::<i64>::new(), TTL).await);
        assert_eq!(service.get::<Vec<i64>>(&key).await, Some(vec![]));
    }

    #[tokio::test]
    async fn test_failing_store_still_serves_computed_value() {
        let service = CacheService::new(Arc::new(DownStore), DEFAULT_STORE_TIMEOUT);
        let key = genres_key();

        let value: Result<String, ()> = service
            .get_or_compute(&key, TTL, || async { Ok("drama".to_string()) })
            .await;

        assert_eq!(value, Ok("drama".to_string()));
        assert!(!service.set(&key, "x", TTL).await);
        assert!(!service.delete(&key).await);
        assert_eq!(service.get::<String>(&key).await, None);
        assert!(service.stats().errors >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_store_is_bounded() {
        let service = CacheService::new(Arc::new(HangingStore), Duration::from_millis(100));
        let key = genres_key();

        let value: Result<u32, ()> = service.get_or_compute(&key, TTL, || async { Ok(7) }).await;

        assert_eq!(value, Ok(7));
        assert_eq!(service.stats().errors, 2);
    }

    #[tokio::test]
    async fn test_delete_removes_value() {
        let service = memory_service();
        let key = genres_key();

        service.set(&key, "cached", TTL).await;
        assert!(service.delete(&key).await);

        assert_eq!(service.get::<String>(&key).await, None);
        assert!(service.index().is_empty());
    }

    #[tokio::test]
    async fn test_purge_and_clear() {
        let service = memory_service();
        let page_one = build_key(Category::SearchResults, &KeyParams::new().with("page", 1i64));
        let page_two = build_key(Category::SearchResults, &KeyParams::new().with("page", 2i64));

        service.set(&page_one, "a", TTL).await;
        service.set(&page_two, "b", TTL).await;
        service.set(&genres_key(), "c", TTL).await;

        assert_eq!(service.purge("search:*").await, 2);
        assert_eq!(service.entry_count().await, Some(1));

        assert!(service.clear().await);
        assert_eq!(service.entry_count().await, Some(0));
    }

    /// Store without pattern delete whose deletes fail while `failing` is set.
    struct FlakyPlainStore {
        inner: MemoryStore,
        failing: std::sync::atomic::AtomicBool,
    }

    impl FlakyPlainStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(100),
                failing: std::sync::atomic::AtomicBool::new(false),
            }
        }

        fn fail_deletes(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl KeyValueStore for FlakyPlainStore {
        fn backend_name(&self) -> &'static str {
            "flaky"
        }
        fn supports_pattern_delete(&self) -> bool {
            false
        }
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }
        async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
            self.inner.set(key, value, ttl).await
        }
        async fn delete(&self, key: &str) -> Result<bool, StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection reset".into()));
            }
            self.inner.delete(key).await
        }
        async fn delete_pattern(&self, _pattern: &str) -> Result<usize, StoreError> {
            Err(StoreError::Unsupported("flaky"))
        }
        async fn clear(&self) -> Result<(), StoreError> {
            self.inner.clear().await
        }
        async fn len(&self) -> Result<usize, StoreError> {
            self.inner.len().await
        }
    }

    #[tokio::test]
    async fn test_delete_reports_only_real_removals() {
        let service = memory_service();
        let key = genres_key();

        assert!(!service.delete(&key).await);
        service.set(&key, "cached", TTL).await;
        assert!(service.delete(&key).await);
        assert_eq!(service.stats().errors, 0);
    }

    #[tokio::test]
    async fn test_memory_store_writes_are_not_indexed() {
        let service = memory_service();

        service.set(&genres_key(), "g", TTL).await;

        assert!(service.index().is_empty());
    }

    #[tokio::test]
    async fn test_failed_deletes_keep_keys_indexed() {
        let store = Arc::new(FlakyPlainStore::new());
        let service = CacheService::new(store.clone(), DEFAULT_STORE_TIMEOUT);
        let page_one = build_key(Category::SearchResults, &KeyParams::new().with("page", 1i64));
        let page_two = build_key(Category::SearchResults, &KeyParams::new().with("page", 2i64));
        service.set(&page_one, "a", TTL).await;
        service.set(&page_two, "b", TTL).await;

        store.fail_deletes(true);
        assert_eq!(service.purge("search:*").await, 0);
        assert!(!service.delete(&page_one).await);
        assert_eq!(service.index().len(), 2);

        store.fail_deletes(false);
        assert_eq!(service.purge("search:*").await, 2);
        assert!(service.index().is_empty());
        assert_eq!(service.entry_count().await, Some(0));
    }
}
