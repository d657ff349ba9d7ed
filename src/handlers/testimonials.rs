use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::database::models::Testimonial;
use crate::middleware::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::testimonials::{CreateTestimonial, TestimonialService, UpdateTestimonial};
use crate::services::{Page, Pagination};
use crate::state::AppState;

/// GET /api/testimonials
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Page<Testimonial>> {
    let service = TestimonialService::new(state.pool.clone());
    let page = service.list(principal.tenant_id, &pagination).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/testimonials/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Testimonial> {
    let service = TestimonialService::new(state.pool.clone());
    let testimonial = service.get(principal.tenant_id, id).await?;
    Ok(ApiResponse::success(testimonial))
}

/// POST /api/testimonials
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(dto): Json<CreateTestimonial>,
) -> ApiResult<Testimonial> {
    let service = TestimonialService::new(state.pool.clone());
    let testimonial = service.create(principal.tenant_id, dto).await?;
    Ok(ApiResponse::created(testimonial))
}

/// PATCH /api/testimonials/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateTestimonial>,
) -> ApiResult<Testimonial> {
    let service = TestimonialService::new(state.pool.clone());
    let testimonial = service.update(principal.tenant_id, id, dto).await?;
    Ok(ApiResponse::success(testimonial))
}

/// DELETE /api/testimonials/:id
///
/// The delete commits first; the cleanup sweep over section content runs
/// best-effort afterwards inside the service.
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let service = TestimonialService::new(state.pool.clone());
    service.delete(principal.tenant_id, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
