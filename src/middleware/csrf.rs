//! CSRF double-submit guard.
//!
//! State-mutating requests must present a server-issued token in the
//! `X-CSRF-Token` header in addition to whatever cookie-based credential the
//! browser sends implicitly; a third-party page cannot set the header, so it
//! cannot forge a validly-authenticated mutating request. The guard is
//! fail-closed: every ambiguity resolves to rejection except bearer decode
//! failure, which degrades to validating without session binding (absence of
//! a usable session context does not itself block the request).

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::auth;
use crate::error::ApiError;
use crate::middleware::auth::extract_bearer;

/// Header carrying the anti-forgery token. Cookies are never consulted.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Pre-authentication endpoints that cannot carry a token yet. Matched on
/// the normalized path, exact or as a `prefix/` segment boundary.
const EXEMPT_PREFIXES: &[&str] = &[
    "/auth/csrf-token",
    "/auth/login",
    "/auth/signup",
    "/auth/password-reset",
    "/auth/verify-otp",
    "/auth/mfa",
];

/// Validates a submitted token against the session-bound record.
#[async_trait]
pub trait CsrfTokenValidator: Send + Sync {
    async fn validate(
        &self,
        token: &str,
        session_id: Option<&str>,
        user_id: Option<&str>,
    ) -> bool;
}

/// Lower-case the path, strip any query string and trailing slashes.
pub fn normalize_path(path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_lowercase()
    }
}

/// Exempt when the normalized path equals an allow-listed prefix or sits
/// under it at a `/` boundary.
pub fn is_exempt_path(normalized: &str) -> bool {
    EXEMPT_PREFIXES.iter().any(|prefix| {
        normalized == *prefix || normalized.starts_with(&format!("{prefix}/"))
    })
}

/// Anti-forgery middleware for state-changing requests.
pub async fn csrf_guard(
    State(validator): State<Arc<dyn CsrfTokenValidator>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let method = request.method();
    if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
        tracing::debug!(%method, "csrf: safe method, skipping");
        return Ok(next.run(request).await);
    }

    let path = normalize_path(request.uri().path());
    if is_exempt_path(&path) {
        tracing::debug!(%path, "csrf: exempt path, skipping");
        return Ok(next.run(request).await);
    }

    // Header token is mandatory; a missing header is rejected without ever
    // consulting the validator so "missing" and "invalid" stay separable in
    // the logs.
    let Some(token) = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        tracing::warn!(%method, %path, "csrf: token missing");
        return Err(ApiError::forbidden("CSRF token missing"));
    };

    // Advisory session binding from the bearer payload. The signature is NOT
    // checked here: enforcing it is the JWT middleware's job on the same
    // pipeline, and a decode failure merely leaves the validation unbound.
    let claims = extract_bearer(request.headers())
        .ok()
        .and_then(|bearer| auth::decode_unverified(&bearer));
    let (session_id, user_id) = match &claims {
        Some(c) => (c.session_id(), c.sub.as_deref()),
        None => (None, None),
    };

    if !validator.validate(&token, session_id, user_id).await {
        tracing::warn!(%method, %path, "csrf: token rejected");
        return Err(ApiError::forbidden("Invalid CSRF token"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_query_case_and_trailing_slash() {
        assert_eq!(normalize_path("/Auth/Login/?next=/x"), "/auth/login");
        assert_eq!(normalize_path("/api/sections//"), "/api/sections");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn exempt_matches_exact_and_segment_prefix() {
        assert!(is_exempt_path("/auth/login"));
        assert!(is_exempt_path("/auth/login/mfa"));
        assert!(is_exempt_path("/auth/csrf-token"));
        assert!(!is_exempt_path("/auth/login-audit"));
        assert!(!is_exempt_path("/api/sections"));
    }
}
