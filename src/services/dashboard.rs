use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache::{keys, Cache};
use crate::error::ApiError;

/// Entity counts shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub categories: i64,
    pub sections: i64,
    pub testimonials: i64,
    pub seo_entries: i64,
    pub users: i64,
}

/// Count of active users per role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

pub struct DashboardService {
    pool: PgPool,
    cache: Cache,
}

impl DashboardService {
    pub fn new(pool: PgPool, cache: Cache) -> Self {
        Self { pool, cache }
    }

    fn stats_key(tenant_id: Uuid) -> String {
        format!("{}:{}", keys::DASHBOARD_STATS, tenant_id)
    }

    fn roles_key(tenant_id: Uuid) -> String {
        format!("{}:{}", keys::DASHBOARD_ROLES, tenant_id)
    }

    pub async fn stats(&self, tenant_id: Uuid) -> Result<DashboardStats, ApiError> {
        let key = Self::stats_key(tenant_id);

        if let Some(cached) = self.cached::<DashboardStats>(&key).await {
            return Ok(cached);
        }

        let (categories, sections, testimonials, seo_entries, users): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM categories WHERE tenant_id = $1),
                    (SELECT COUNT(*) FROM sections WHERE tenant_id = $1),
                    (SELECT COUNT(*) FROM testimonials WHERE tenant_id = $1),
                    (SELECT COUNT(*) FROM seo_entries WHERE tenant_id = $1),
                    (SELECT COUNT(*) FROM users WHERE tenant_id = $1)
                "#,
            )
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        let stats = DashboardStats { categories, sections, testimonials, seo_entries, users };
        self.store(&key, &stats, keys::DASHBOARD_STATS_TTL).await;
        Ok(stats)
    }

    pub async fn roles(&self, tenant_id: Uuid) -> Result<Vec<RoleCount>, ApiError> {
        let key = Self::roles_key(tenant_id);

        if let Some(cached) = self.cached::<Vec<RoleCount>>(&key).await {
            return Ok(cached);
        }

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT role, COUNT(*) FROM users
            WHERE tenant_id = $1 AND is_active = TRUE
            GROUP BY role ORDER BY role
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        let roles: Vec<RoleCount> =
            rows.into_iter().map(|(role, count)| RoleCount { role, count }).collect();
        self.store(&key, &roles, keys::DASHBOARD_ROLES_TTL).await;
        Ok(roles)
    }

    /// Cache reads never fail the request; a broken backend is a miss.
    async fn cached<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(value)) => serde_json::from_value(value).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("dashboard cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T, ttl: std::time::Duration) {
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };
        if let Err(e) = self.cache.set(key, value, ttl).await {
            tracing::warn!("dashboard cache write failed for {}: {}", key, e);
        }
    }
}
