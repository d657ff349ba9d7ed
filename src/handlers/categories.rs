use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::database::models::Category;
use crate::middleware::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::categories::{CategoryService, CreateCategory, UpdateCategory};
use crate::services::{Page, Pagination};
use crate::state::AppState;

/// GET /api/categories
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Page<Category>> {
    let service = CategoryService::new(state.pool.clone());
    let page = service.list(principal.tenant_id, &pagination).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/categories/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Category> {
    let service = CategoryService::new(state.pool.clone());
    let category = service.get(principal.tenant_id, id).await?;
    Ok(ApiResponse::success(category))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(dto): Json<CreateCategory>,
) -> ApiResult<Category> {
    let service = CategoryService::new(state.pool.clone());
    let category = service.create(principal.tenant_id, dto).await?;
    Ok(ApiResponse::created(category))
}

/// PATCH /api/categories/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateCategory>,
) -> ApiResult<Category> {
    let service = CategoryService::new(state.pool.clone());
    let category = service.update(principal.tenant_id, id, dto).await?;
    Ok(ApiResponse::success(category))
}

/// DELETE /api/categories/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let service = CategoryService::new(state.pool.clone());
    service.delete(principal.tenant_id, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
