use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;

use super::{CacheError, CacheStore};

/// Namespace prefix for every key this process writes to Redis.
const KEY_PREFIX: &str = "cms:";

/// Redis-backed cache for multi-instance deployments.
///
/// `ConnectionManager` handles reconnection; expiry is delegated to Redis
/// via `SET EX`, so there is no sweep task on this backend.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::Backend(format!("failed to create redis client: {e}")))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Backend(format!("failed to connect to redis: {e}")))?;

        tracing::info!("Connected to redis cache backend");
        Ok(Self { manager })
    }

    fn build_key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = self.manager.clone();
        let raw: Option<Vec<u8>> = conn
            .get(Self::build_key(key))
            .await
            .map_err(|e| CacheError::Backend(format!("redis GET failed: {e}")))?;

        match raw {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        let serialized = serde_json::to_vec(&value)?;
        let mut conn = self.manager.clone();

        // SET with EX expires the key atomically with the write
        conn.set_ex::<_, _, ()>(Self::build_key(key), serialized, ttl.as_secs())
            .await
            .map_err(|e| CacheError::Backend(format!("redis SET failed: {e}")))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(Self::build_key(key))
            .await
            .map_err(|e| CacheError::Backend(format!("redis DEL failed: {e}")))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let pattern = format!("{KEY_PREFIX}*");
        let mut cursor: u64 = 0;

        // SCAN the namespace rather than FLUSHDB; the database may be shared
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Backend(format!("redis SCAN failed: {e}")))?;

            if !keys.is_empty() {
                conn.del::<_, ()>(keys)
                    .await
                    .map_err(|e| CacheError::Backend(format!("redis DEL failed: {e}")))?;
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(())
    }
}
