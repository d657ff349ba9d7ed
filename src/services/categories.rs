use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Page, Pagination};
use crate::database::models::Category;
use crate::error::ApiError;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

impl CreateCategory {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require_non_empty("name", &self.name)
            .max_len("name", &self.name, 120)
            .slug("slug", &self.slug);
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateCategory {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.require_non_empty("name", name).max_len("name", name, 120);
        }
        if let Some(slug) = &self.slug {
            v.slug("slug", slug);
        }
        v.finish()
    }
}

pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        pagination: &Pagination,
    ) -> Result<Page<Category>, ApiError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        let items: Vec<Category> = sqlx::query_as(
            "SELECT * FROM categories WHERE tenant_id = $1 ORDER BY name LIMIT $2 OFFSET $3",
        )
        .bind(tenant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, pagination))
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<Category, ApiError> {
        let category: Option<Category> =
            sqlx::query_as("SELECT * FROM categories WHERE tenant_id = $1 AND id = $2")
                .bind(tenant_id)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        category.ok_or_else(|| ApiError::not_found("Category not found"))
    }

    pub async fn create(&self, tenant_id: Uuid, dto: CreateCategory) -> Result<Category, ApiError> {
        dto.validate()?;

        let category: Category = sqlx::query_as(
            r#"
            INSERT INTO categories (id, tenant_id, name, slug, description, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(dto.name.trim())
        .bind(&dto.slug)
        .bind(&dto.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::conflict("Category slug already exists")
            }
            _ => ApiError::from(e),
        })?;

        Ok(category)
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        dto: UpdateCategory,
    ) -> Result<Category, ApiError> {
        dto.validate()?;

        let category: Option<Category> = sqlx::query_as(
            r#"
            UPDATE categories SET
                name = COALESCE($3, name),
                slug = COALESCE($4, slug),
                description = COALESCE($5, description),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(&dto.slug)
        .bind(&dto.description)
        .bind(dto.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::conflict("Category slug already exists")
            }
            _ => ApiError::from(e),
        })?;

        category.ok_or_else(|| ApiError::not_found("Category not found"))
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM categories WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Category not found"));
        }

        Ok(())
    }
}
