//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from the
//! in-memory store.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;

/// Spawns a background task that periodically drops expired store entries.
///
/// The task runs until aborted, sleeping for `interval` between sweeps.
/// Reads already skip expired entries; the sweep only reclaims memory.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "Starting TTL cleanup task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;
            if removed > 0 {
                info!(removed, "TTL cleanup: removed expired entries");
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::KeyValueStore;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let store = Arc::new(MemoryStore::new(100));
        store
            .set("expire_soon", "1".to_string(), Duration::from_millis(50))
            .await
            .unwrap();
        store
            .set("long_lived", "2".to_string(), Duration::from_secs(3600))
            .await
            .unwrap();

        let handle = spawn_cleanup_task(store.clone(), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(350)).await;

        // Only the live entry is left in the map
        assert_eq!(store.cleanup_expired().await, 0);
        assert_eq!(store.len().await.unwrap(), 1);
        assert_eq!(store.get("long_lived").await.unwrap().as_deref(), Some("2"));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let store = Arc::new(MemoryStore::new(100));

        let handle = spawn_cleanup_task(store, Duration::from_secs(1));
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
