use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::database::models::{Section, SectionTranslation};
use crate::middleware::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::sections::{CreateSection, SectionService, UpdateSection, UpsertTranslation};
use crate::services::{Page, Pagination};
use crate::state::AppState;

/// GET /api/sections
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Page<Section>> {
    let service = SectionService::new(state.pool.clone());
    let page = service.list(principal.tenant_id, &pagination).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/sections/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Section> {
    let service = SectionService::new(state.pool.clone());
    let section = service.get(principal.tenant_id, id).await?;
    Ok(ApiResponse::success(section))
}

/// GET /api/sections/:id/translations
pub async fn translations(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<SectionTranslation>> {
    let service = SectionService::new(state.pool.clone());
    let rows = service.translations(principal.tenant_id, id).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/sections
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(dto): Json<CreateSection>,
) -> ApiResult<Section> {
    let service = SectionService::new(state.pool.clone());
    let section = service.create(principal.tenant_id, dto).await?;
    Ok(ApiResponse::created(section))
}

/// PATCH /api/sections/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateSection>,
) -> ApiResult<Section> {
    let service = SectionService::new(state.pool.clone());
    let section = service.update(principal.tenant_id, id, dto).await?;
    Ok(ApiResponse::success(section))
}

/// PUT /api/sections/:id/translations/:locale
pub async fn upsert_translation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, locale)): Path<(Uuid, String)>,
    Json(dto): Json<UpsertTranslation>,
) -> ApiResult<SectionTranslation> {
    let service = SectionService::new(state.pool.clone());
    let translation = service
        .upsert_translation(principal.tenant_id, id, &locale, dto)
        .await?;
    Ok(ApiResponse::success(translation))
}

/// DELETE /api/sections/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let service = SectionService::new(state.pool.clone());
    service.delete(principal.tenant_id, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
