use axum::{extract::State, http::HeaderMap};
use serde_json::{json, Value};

use crate::auth;
use crate::middleware::auth::extract_bearer;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /auth/csrf-token - issue an anti-forgery token.
///
/// Allow-listed: this is where a client gets its first token, so it cannot
/// require one. The token is bound to whatever session/user the presented
/// bearer decodes to; no bearer (or an undecodable one) yields an unbound
/// token.
pub async fn csrf_token(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    let claims = extract_bearer(&headers)
        .ok()
        .and_then(|bearer| auth::decode_unverified(&bearer));
    let (session_id, user_id) = match &claims {
        Some(c) => (c.session_id(), c.sub.as_deref()),
        None => (None, None),
    };

    let token = state.csrf_tokens.issue(session_id, user_id).await?;

    Ok(ApiResponse::success(json!({ "csrfToken": token })))
}
