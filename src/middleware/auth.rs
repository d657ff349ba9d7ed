use std::collections::HashSet;

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::database::DatabaseManager;
use crate::error::ApiError;

/// Authenticated identity extracted from a verified JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        let session_id = claims.session_id().map(str::to_string);
        Self { user_id: claims.sub, session_id }
    }
}

/// Server-resolved principal: role and permission set loaded from the users
/// table, never from client-supplied fields.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: String,
    pub permissions: HashSet<String>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// JWT authentication middleware: verifies the bearer signature and expiry
/// and injects the token's identity. This is the only place signature
/// validity is enforced; downstream guards treat decoded claims as settled.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).map_err(ApiError::unauthorized)?;

    let claims = auth::verify_token(&token)
        .map_err(|e| ApiError::unauthorized(format!("Invalid bearer token: {e}")))?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Resolve the principal's role and permission set from persistent storage.
/// Missing or deactivated users fail closed.
pub async fn resolve_principal_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required"))?;

    let pool = DatabaseManager::pool().await.map_err(|e| {
        tracing::error!("Database unavailable while resolving principal: {}", e);
        ApiError::service_unavailable("Database temporarily unavailable")
    })?;

    let row: Option<(Uuid, String, Vec<String>)> = sqlx::query_as(
        "SELECT tenant_id, role, permissions FROM users WHERE id = $1 AND is_active = TRUE",
    )
    .bind(auth_user.user_id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Database error resolving principal {}: {}", auth_user.user_id, e);
        ApiError::internal_server_error("Failed to resolve user")
    })?;

    let (tenant_id, role, permissions) = row.ok_or_else(|| {
        tracing::warn!("Principal resolution failed: user {} not active", auth_user.user_id);
        ApiError::forbidden("User is not active")
    })?;

    let principal = Principal {
        user_id: auth_user.user_id,
        tenant_id,
        role,
        permissions: permissions.into_iter().collect(),
    };

    tracing::debug!(user_id = %principal.user_id, role = %principal.role, "principal resolved");
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Extract a bearer token from the Authorization header
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extract_bearer_requires_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer tok123"));
        assert_eq!(extract_bearer(&headers).unwrap(), "tok123");
    }

    #[test]
    fn extract_bearer_rejects_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_bearer(&headers).is_err());
    }
}
