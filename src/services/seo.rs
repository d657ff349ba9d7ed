use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Page, Pagination};
use crate::database::models::SeoEntry;
use crate::error::ApiError;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct CreateSeoEntry {
    pub path: String,
    pub title: String,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub og_image: Option<String>,
}

impl CreateSeoEntry {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require_non_empty("path", &self.path)
            .relative_path("path", &self.path)
            .require_non_empty("title", &self.title)
            .max_len("title", &self.title, 200);
        if let Some(url) = &self.og_image {
            v.url("ogImage", url);
        }
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSeoEntry {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub og_image: Option<String>,
}

impl UpdateSeoEntry {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(title) = &self.title {
            v.require_non_empty("title", title).max_len("title", title, 200);
        }
        if let Some(url) = &self.og_image {
            v.url("ogImage", url);
        }
        v.finish()
    }
}

pub struct SeoService {
    pool: PgPool,
}

impl SeoService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        pagination: &Pagination,
    ) -> Result<Page<SeoEntry>, ApiError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seo_entries WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        let items: Vec<SeoEntry> = sqlx::query_as(
            "SELECT * FROM seo_entries WHERE tenant_id = $1 ORDER BY path LIMIT $2 OFFSET $3",
        )
        .bind(tenant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, pagination))
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<SeoEntry, ApiError> {
        let entry: Option<SeoEntry> =
            sqlx::query_as("SELECT * FROM seo_entries WHERE tenant_id = $1 AND id = $2")
                .bind(tenant_id)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        entry.ok_or_else(|| ApiError::not_found("SEO entry not found"))
    }

    pub async fn create(&self, tenant_id: Uuid, dto: CreateSeoEntry) -> Result<SeoEntry, ApiError> {
        dto.validate()?;

        let entry: SeoEntry = sqlx::query_as(
            r#"
            INSERT INTO seo_entries
                (id, tenant_id, path, title, description, keywords, og_image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(&dto.path)
        .bind(dto.title.trim())
        .bind(&dto.description)
        .bind(&dto.keywords)
        .bind(&dto.og_image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::conflict("SEO entry already exists for this path")
            }
            _ => ApiError::from(e),
        })?;

        Ok(entry)
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        dto: UpdateSeoEntry,
    ) -> Result<SeoEntry, ApiError> {
        dto.validate()?;

        let entry: Option<SeoEntry> = sqlx::query_as(
            r#"
            UPDATE seo_entries SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                keywords = COALESCE($5, keywords),
                og_image = COALESCE($6, og_image),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(&dto.keywords)
        .bind(&dto.og_image)
        .fetch_optional(&self.pool)
        .await?;

        entry.ok_or_else(|| ApiError::not_found("SEO entry not found"))
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM seo_entries WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("SEO entry not found"));
        }

        Ok(())
    }
}
