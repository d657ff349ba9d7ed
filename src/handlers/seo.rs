use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::database::models::SeoEntry;
use crate::middleware::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::seo::{CreateSeoEntry, SeoService, UpdateSeoEntry};
use crate::services::{Page, Pagination};
use crate::state::AppState;

/// GET /api/seo
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Page<SeoEntry>> {
    let service = SeoService::new(state.pool.clone());
    let page = service.list(principal.tenant_id, &pagination).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/seo/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<SeoEntry> {
    let service = SeoService::new(state.pool.clone());
    let entry = service.get(principal.tenant_id, id).await?;
    Ok(ApiResponse::success(entry))
}

/// POST /api/seo
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(dto): Json<CreateSeoEntry>,
) -> ApiResult<SeoEntry> {
    let service = SeoService::new(state.pool.clone());
    let entry = service.create(principal.tenant_id, dto).await?;
    Ok(ApiResponse::created(entry))
}

/// PATCH /api/seo/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateSeoEntry>,
) -> ApiResult<SeoEntry> {
    let service = SeoService::new(state.pool.clone());
    let entry = service.update(principal.tenant_id, id, dto).await?;
    Ok(ApiResponse::success(entry))
}

/// DELETE /api/seo/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let service = SeoService::new(state.pool.clone());
    service.delete(principal.tenant_id, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
