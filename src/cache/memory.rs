use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{CacheError, CacheStore};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local expiring map.
///
/// An entry is logically absent once expired even while physically retained;
/// the background sweep task removes dead entries on an interval so the map
/// does not grow without bound under churn.
#[derive(Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self { store: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Create a cache with a background sweep task removing expired entries.
    pub fn with_sweeper(interval: Duration) -> Self {
        let cache = Self::new();
        let store = cache.store.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                Self::sweep_expired(&store).await;
            }
        });

        cache
    }

    async fn sweep_expired(store: &Arc<RwLock<HashMap<String, CacheEntry>>>) {
        let mut guard = store.write().await;
        let before = guard.len();
        guard.retain(|_, entry| !entry.is_expired());
        let removed = before - guard.len();
        drop(guard);

        if removed > 0 {
            tracing::debug!("Swept {} expired cache entries", removed);
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let store = self.store.read().await;
        Ok(store
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry { value, expires_at: Instant::now() + ttl };
        self.store.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.store.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = MemoryCache::new();
        cache.set("k", json!({"n": 1}), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"n": 1})));
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache.set("k", json!("v"), Duration::from_millis(50)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_and_clear_remove_entries() {
        let cache = MemoryCache::new();
        cache.set("a", json!(1), Duration::from_secs(60)).await.unwrap();
        cache.set("b", json!(2), Duration::from_secs(60)).await.unwrap();

        cache.delete("a").await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert_eq!(cache.get("b").await.unwrap(), Some(json!(2)));

        cache.clear().await.unwrap();
        assert_eq!(cache.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn sweep_drops_only_expired_entries() {
        let cache = MemoryCache::new();
        cache.set("old", json!(1), Duration::from_millis(10)).await.unwrap();
        cache.set("live", json!(2), Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        MemoryCache::sweep_expired(&cache.store).await;

        let store = cache.store.read().await;
        assert!(!store.contains_key("old"));
        assert!(store.contains_key("live"));
    }
}
