//! Pass-through cache abstraction backing short-lived read results.
//!
//! The backend is selected by configuration and injected at construction:
//! a process-local expiring map for single-instance deployments, or Redis
//! for multi-instance ones. Cached values are always rebuildable from the
//! source of truth; overlapping writers race benignly (last write wins).

pub mod memory;
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{CacheBackend, CacheConfig};

/// Cache key namespace and TTL conventions used across the services.
pub mod keys {
    use std::time::Duration;

    pub const DASHBOARD_STATS: &str = "dashboard:stats";
    pub const DASHBOARD_STATS_TTL: Duration = Duration::from_secs(180);

    pub const DASHBOARD_ROLES: &str = "dashboard:roles";
    pub const DASHBOARD_ROLES_TTL: Duration = Duration::from_secs(3600);

    pub const CSRF_PREFIX: &str = "csrf:";
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Pluggable cache backend. String keys, JSON values, TTL per call.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    async fn clear(&self) -> Result<(), CacheError>;
}

/// Shared handle over the configured backend.
#[derive(Clone)]
pub struct Cache {
    inner: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { inner: store }
    }

    /// Build the backend the configuration selects.
    pub async fn from_config(config: &CacheConfig) -> anyhow::Result<Self> {
        match config.backend {
            CacheBackend::Memory => {
                tracing::info!(
                    "Initializing in-memory cache (sweep interval: {}s)",
                    config.sweep_interval_secs
                );
                let store = memory::MemoryCache::with_sweeper(Duration::from_secs(
                    config.sweep_interval_secs,
                ));
                Ok(Self::new(Arc::new(store)))
            }
            CacheBackend::Redis => {
                let url = config
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("REDIS_URL required for redis cache backend"))?;
                tracing::info!("Initializing redis cache");
                let store = redis::RedisCache::connect(url).await?;
                Ok(Self::new(Arc::new(store)))
            }
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        self.inner.get(key).await
    }

    pub async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        self.inner.set(key, value, ttl).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.delete(key).await
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        self.inner.clear().await
    }
}
