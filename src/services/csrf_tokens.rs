//! Server-issued CSRF token records, cache-backed.
//!
//! A token is bound at issuance to whatever session/user context presented
//! itself, lives for a fixed window and is consumed by its first successful
//! validation.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::cache::{keys, Cache};
use crate::error::ApiError;
use crate::middleware::csrf::CsrfTokenValidator;

pub struct CsrfTokenService {
    cache: Cache,
    ttl: Duration,
}

impl CsrfTokenService {
    pub fn new(cache: Cache, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn cache_key(token: &str) -> String {
        format!("{}{}", keys::CSRF_PREFIX, token)
    }

    fn generate_token() -> String {
        let mut hasher = Sha256::new();
        hasher.update(Uuid::new_v4().as_bytes());
        hasher.update(Uuid::new_v4().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Issue a fresh token bound to the presenting session/user context.
    pub async fn issue(
        &self,
        session_id: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<String, ApiError> {
        let token = Self::generate_token();
        let record = json!({
            "sessionId": session_id,
            "userId": user_id,
        });

        self.cache
            .set(&Self::cache_key(&token), record, self.ttl)
            .await
            .map_err(|e| {
                tracing::error!("failed to store CSRF token: {}", e);
                ApiError::internal_server_error("Failed to issue CSRF token")
            })?;

        Ok(token)
    }

    /// A stored binding component, when known, must equal the presented one;
    /// unknown components are wildcards.
    fn binding_matches(stored: Option<&str>, presented: Option<&str>) -> bool {
        match stored {
            None => true,
            Some(expected) => presented == Some(expected),
        }
    }
}

#[async_trait]
impl CsrfTokenValidator for CsrfTokenService {
    async fn validate(
        &self,
        token: &str,
        session_id: Option<&str>,
        user_id: Option<&str>,
    ) -> bool {
        let key = Self::cache_key(token);

        let record = match self.cache.get(&key).await {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(e) => {
                // Fail closed on backend trouble
                tracing::error!("CSRF token lookup failed: {}", e);
                return false;
            }
        };

        let stored_session = record.get("sessionId").and_then(|v| v.as_str());
        let stored_user = record.get("userId").and_then(|v| v.as_str());

        if !Self::binding_matches(stored_session, session_id)
            || !Self::binding_matches(stored_user, user_id)
        {
            tracing::warn!("CSRF token presented with mismatched session binding");
            return false;
        }

        // Single use: consume the record on successful validation
        if let Err(e) = self.cache.delete(&key).await {
            tracing::error!("failed to consume CSRF token: {}", e);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use std::sync::Arc;

    fn service(ttl: Duration) -> CsrfTokenService {
        CsrfTokenService::new(Cache::new(Arc::new(MemoryCache::new())), ttl)
    }

    #[tokio::test]
    async fn issued_token_validates_once() {
        let svc = service(Duration::from_secs(60));
        let token = svc.issue(Some("sess-1"), Some("user-1")).await.unwrap();

        assert!(svc.validate(&token, Some("sess-1"), Some("user-1")).await);
        // Consumed by the first validation
        assert!(!svc.validate(&token, Some("sess-1"), Some("user-1")).await);
    }

    #[tokio::test]
    async fn bound_token_rejects_other_sessions() {
        let svc = service(Duration::from_secs(60));
        let token = svc.issue(Some("sess-1"), None).await.unwrap();

        assert!(!svc.validate(&token, Some("sess-2"), None).await);
        assert!(!svc.validate(&token, None, None).await);
        // Failed attempts must not consume the token
        assert!(svc.validate(&token, Some("sess-1"), None).await);
    }

    #[tokio::test]
    async fn unbound_token_validates_for_anyone() {
        let svc = service(Duration::from_secs(60));
        let token = svc.issue(None, None).await.unwrap();
        assert!(svc.validate(&token, Some("sess-9"), Some("user-9")).await);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let svc = service(Duration::from_millis(40));
        let token = svc.issue(None, None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!svc.validate(&token, None, None).await);
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let svc = service(Duration::from_secs(60));
        assert!(!svc.validate("deadbeef", None, None).await);
    }
}
