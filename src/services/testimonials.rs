use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Page, Pagination};
use crate::content::{self, ContentKind, DeletedEntity};
use crate::database::models::Testimonial;
use crate::error::ApiError;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct CreateTestimonial {
    pub client_name: String,
    pub quote: String,
    pub rating: i16,
    pub image_url: Option<String>,
}

impl CreateTestimonial {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.require_non_empty("clientName", &self.client_name)
            .max_len("clientName", &self.client_name, 120)
            .require_non_empty("quote", &self.quote)
            .max_len("quote", &self.quote, 2000)
            .rating("rating", self.rating);
        if let Some(url) = &self.image_url {
            v.url("imageUrl", url);
        }
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTestimonial {
    pub client_name: Option<String>,
    pub quote: Option<String>,
    pub rating: Option<i16>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateTestimonial {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(name) = &self.client_name {
            v.require_non_empty("clientName", name).max_len("clientName", name, 120);
        }
        if let Some(quote) = &self.quote {
            v.require_non_empty("quote", quote).max_len("quote", quote, 2000);
        }
        if let Some(rating) = self.rating {
            v.rating("rating", rating);
        }
        if let Some(url) = &self.image_url {
            v.url("imageUrl", url);
        }
        v.finish()
    }
}

pub struct TestimonialService {
    pool: PgPool,
}

impl TestimonialService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        pagination: &Pagination,
    ) -> Result<Page<Testimonial>, ApiError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM testimonials WHERE tenant_id = $1")
                .bind(tenant_id)
                .fetch_one(&self.pool)
                .await?;

        let items: Vec<Testimonial> = sqlx::query_as(
            "SELECT * FROM testimonials WHERE tenant_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(tenant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, pagination))
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<Testimonial, ApiError> {
        let testimonial: Option<Testimonial> =
            sqlx::query_as("SELECT * FROM testimonials WHERE tenant_id = $1 AND id = $2")
                .bind(tenant_id)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        testimonial.ok_or_else(|| ApiError::not_found("Testimonial not found"))
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        dto: CreateTestimonial,
    ) -> Result<Testimonial, ApiError> {
        dto.validate()?;

        let testimonial: Testimonial = sqlx::query_as(
            r#"
            INSERT INTO testimonials
                (id, tenant_id, client_name, quote, rating, image_url, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(dto.client_name.trim())
        .bind(&dto.quote)
        .bind(dto.rating)
        .bind(&dto.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(testimonial)
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        dto: UpdateTestimonial,
    ) -> Result<Testimonial, ApiError> {
        dto.validate()?;

        let deactivating = dto.is_active == Some(false);

        let testimonial: Option<Testimonial> = sqlx::query_as(
            r#"
            UPDATE testimonials SET
                client_name = COALESCE($3, client_name),
                quote = COALESCE($4, quote),
                rating = COALESCE($5, rating),
                image_url = COALESCE($6, image_url),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(dto.client_name.as_deref().map(str::trim))
        .bind(&dto.quote)
        .bind(dto.rating)
        .bind(&dto.image_url)
        .bind(dto.is_active)
        .fetch_optional(&self.pool)
        .await?;

        let testimonial = testimonial.ok_or_else(|| ApiError::not_found("Testimonial not found"))?;

        // Deactivation hides the testimonial everywhere, so embedded copies
        // must go too.
        if deactivating {
            self.scrub_references(tenant_id, &testimonial).await;
        }

        Ok(testimonial)
    }

    /// Delete the testimonial, then scrub its embedded copies out of all
    /// section content. The scrub is best-effort and never fails the delete.
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let testimonial = self.get(tenant_id, id).await?;

        let result = sqlx::query("DELETE FROM testimonials WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Testimonial not found"));
        }

        self.scrub_references(tenant_id, &testimonial).await;
        Ok(())
    }

    async fn scrub_references(&self, tenant_id: Uuid, testimonial: &Testimonial) {
        let mut target =
            DeletedEntity::new(testimonial.id.to_string()).with_name(&testimonial.client_name);
        if let Some(url) = &testimonial.image_url {
            target = target.with_image(url);
        }

        let report =
            content::scrub_deleted_entity(&self.pool, tenant_id, ContentKind::Reviews, &target)
                .await;

        if !report.failures.is_empty() {
            tracing::warn!(
                testimonial_id = %testimonial.id,
                failures = report.failures.len(),
                "testimonial cleanup sweep finished with failures"
            );
        }
    }
}
