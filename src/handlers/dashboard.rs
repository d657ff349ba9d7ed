use axum::{extract::State, Extension};

use crate::middleware::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::dashboard::{DashboardService, DashboardStats, RoleCount};
use crate::state::AppState;

/// GET /api/dashboard/stats - entity counts, cached for 3 minutes
pub async fn stats(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<DashboardStats> {
    let service = DashboardService::new(state.pool.clone(), state.cache.clone());
    let stats = service.stats(principal.tenant_id).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/dashboard/roles - active users per role, cached for an hour
pub async fn roles(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<RoleCount>> {
    let service = DashboardService::new(state.pool.clone(), state.cache.clone());
    let roles = service.roles(principal.tenant_id).await?;
    Ok(ApiResponse::success(roles))
}
