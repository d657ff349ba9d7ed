use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::cache::Cache;
use crate::config::AppConfig;
use crate::middleware::csrf::CsrfTokenValidator;
use crate::services::csrf_tokens::CsrfTokenService;
use crate::services::storage::{S3Storage, SharedStorage};

/// Shared application state: every collaborator is injected at construction
/// rather than reached through globals, so tests can swap any of them.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub cache: Cache,
    pub csrf_tokens: Arc<CsrfTokenService>,
    pub storage: SharedStorage,
}

impl AppState {
    pub async fn from_config(config: &AppConfig, pool: PgPool) -> anyhow::Result<Self> {
        let cache = Cache::from_config(&config.cache).await?;
        let csrf_tokens = Arc::new(CsrfTokenService::new(
            cache.clone(),
            Duration::from_secs(config.security.csrf_token_ttl_secs),
        ));
        let storage: SharedStorage = Arc::new(S3Storage::from_config(&config.upload));

        Ok(Self { pool, cache, csrf_tokens, storage })
    }

    /// The CSRF guard takes the validator as its own state.
    pub fn csrf_validator(&self) -> Arc<dyn CsrfTokenValidator> {
        self.csrf_tokens.clone()
    }
}
