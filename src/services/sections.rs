use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Page, Pagination};
use crate::database::models::{Section, SectionTranslation};
use crate::error::ApiError;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct CreateSection {
    pub page_id: Uuid,
    pub name: String,
    pub kind: Option<String>,
}

impl CreateSection {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require_non_empty("name", &self.name).max_len("name", &self.name, 120);
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSection {
    pub name: Option<String>,
    pub kind: Option<String>,
}

impl UpdateSection {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.require_non_empty("name", name).max_len("name", name, 120);
        }
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpsertTranslation {
    pub content: Value,
}

pub struct SectionService {
    pool: PgPool,
}

impl SectionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        pagination: &Pagination,
    ) -> Result<Page<Section>, ApiError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sections WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        let items: Vec<Section> = sqlx::query_as(
            "SELECT * FROM sections WHERE tenant_id = $1 ORDER BY name LIMIT $2 OFFSET $3",
        )
        .bind(tenant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, pagination))
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<Section, ApiError> {
        let section: Option<Section> =
            sqlx::query_as("SELECT * FROM sections WHERE tenant_id = $1 AND id = $2")
                .bind(tenant_id)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        section.ok_or_else(|| ApiError::not_found("Section not found"))
    }

    pub async fn translations(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Vec<SectionTranslation>, ApiError> {
        // Ensure the section exists under this tenant before listing
        self.get(tenant_id, id).await?;

        let rows: Vec<SectionTranslation> = sqlx::query_as(
            "SELECT * FROM section_translations WHERE section_id = $1 ORDER BY locale",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create(&self, tenant_id: Uuid, dto: CreateSection) -> Result<Section, ApiError> {
        dto.validate()?;

        let section: Section = sqlx::query_as(
            r#"
            INSERT INTO sections (id, tenant_id, page_id, name, kind, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(dto.page_id)
        .bind(dto.name.trim())
        .bind(&dto.kind)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::conflict("Section name already exists on this page")
            }
            _ => ApiError::from(e),
        })?;

        Ok(section)
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        dto: UpdateSection,
    ) -> Result<Section, ApiError> {
        dto.validate()?;

        let section: Option<Section> = sqlx::query_as(
            r#"
            UPDATE sections SET
                name = COALESCE($3, name),
                kind = COALESCE($4, kind),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(&dto.kind)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::conflict("Section name already exists on this page")
            }
            _ => ApiError::from(e),
        })?;

        section.ok_or_else(|| ApiError::not_found("Section not found"))
    }

    /// Insert or replace the content document for one locale of a section.
    pub async fn upsert_translation(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        locale: &str,
        dto: UpsertTranslation,
    ) -> Result<SectionTranslation, ApiError> {
        let mut v = Validator::new();
        v.locale("locale", locale);
        v.finish()?;

        // Ensure the section exists under this tenant
        self.get(tenant_id, id).await?;

        let translation: SectionTranslation = sqlx::query_as(
            r#"
            INSERT INTO section_translations (id, section_id, locale, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (section_id, locale)
            DO UPDATE SET content = EXCLUDED.content, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(locale)
        .bind(&dto.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(translation)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        // Translations go with the section; keep both in one transaction
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM section_translations WHERE section_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM sections WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ApiError::not_found("Section not found"));
        }

        tx.commit().await?;
        Ok(())
    }
}
