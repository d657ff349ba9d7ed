//! In-process tests for the CSRF double-submit guard: routing a small axum
//! app through the real middleware and asserting on status codes, error
//! bodies, and whether the validator was consulted at all.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use pagecraft_api::middleware::csrf::{csrf_guard, CsrfTokenValidator, CSRF_HEADER};

/// Scripted validator that records whether and with what it was called.
struct ScriptedValidator {
    accept: bool,
    called: AtomicUsize,
    saw_session: AtomicBool,
    saw_user: AtomicBool,
}

impl ScriptedValidator {
    fn new(accept: bool) -> Arc<Self> {
        Arc::new(Self {
            accept,
            called: AtomicUsize::new(0),
            saw_session: AtomicBool::new(false),
            saw_user: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl CsrfTokenValidator for ScriptedValidator {
    async fn validate(
        &self,
        _token: &str,
        session_id: Option<&str>,
        user_id: Option<&str>,
    ) -> bool {
        self.called.fetch_add(1, Ordering::SeqCst);
        self.saw_session.store(session_id.is_some(), Ordering::SeqCst);
        self.saw_user.store(user_id.is_some(), Ordering::SeqCst);
        self.accept
    }
}

fn app(validator: Arc<ScriptedValidator>) -> Router {
    let validator: Arc<dyn CsrfTokenValidator> = validator;

    Router::new()
        .route("/api/sections", post(|| async { "created" }).get(|| async { "listed" }))
        .route("/auth/login", post(|| async { "logged in" }))
        .route("/health", get(|| async { "ok" }))
        .layer(axum::middleware::from_fn_with_state(validator, csrf_guard))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn safe_methods_bypass_the_guard() {
    let validator = ScriptedValidator::new(false);
    let response = app(validator.clone())
        .oneshot(Request::get("/api/sections").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(validator.called.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_token_rejected_without_consulting_validator() {
    let validator = ScriptedValidator::new(true);
    let response = app(validator.clone())
        .oneshot(Request::post("/api/sections").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(validator.called.load(Ordering::SeqCst), 0);

    let body = body_json(response).await;
    assert_eq!(body["message"], "CSRF token missing");
    assert_eq!(body["statusCode"], 403);
}

#[tokio::test]
async fn invalid_token_rejected_with_distinct_message() {
    let validator = ScriptedValidator::new(false);
    let response = app(validator.clone())
        .oneshot(
            Request::post("/api/sections")
                .header(CSRF_HEADER, "bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(validator.called.load(Ordering::SeqCst), 1);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid CSRF token");
}

#[tokio::test]
async fn valid_token_passes_through() {
    let validator = ScriptedValidator::new(true);
    let response = app(validator)
        .oneshot(
            Request::post("/api/sections")
                .header(CSRF_HEADER, "good-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn exempt_paths_skip_the_guard_even_for_posts() {
    let validator = ScriptedValidator::new(false);
    let response = app(validator.clone())
        .oneshot(Request::post("/auth/login").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(validator.called.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn bearer_session_binding_is_forwarded_to_the_validator() {
    // Unsigned but structurally valid JWT; the guard reads its payload
    // without checking the signature.
    let payload = r#"{"sub":"user-1","sid":"sess-1"}"#;
    let bearer = format!(
        "Bearer {}.{}.{}",
        base64_url(br#"{"alg":"HS256","typ":"JWT"}"#),
        base64_url(payload.as_bytes()),
        base64_url(b"junk")
    );

    let validator = ScriptedValidator::new(true);
    let response = app(validator.clone())
        .oneshot(
            Request::post("/api/sections")
                .header(CSRF_HEADER, "good-token")
                .header("authorization", bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(validator.saw_session.load(Ordering::SeqCst));
    assert!(validator.saw_user.load(Ordering::SeqCst));
}

fn base64_url(input: &[u8]) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
    let mut out = String::new();
    for chunk in input.chunks(3) {
        let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
        let n = (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2]);
        out.push(ALPHABET[(n >> 18) as usize & 63] as char);
        out.push(ALPHABET[(n >> 12) as usize & 63] as char);
        if chunk.len() > 1 {
            out.push(ALPHABET[(n >> 6) as usize & 63] as char);
        }
        if chunk.len() > 2 {
            out.push(ALPHABET[n as usize & 63] as char);
        }
    }
    out
}

#[tokio::test]
async fn malformed_bearer_degrades_to_unbound_validation() {
    let validator = ScriptedValidator::new(true);
    let response = app(validator.clone())
        .oneshot(
            Request::post("/api/sections")
                .header(CSRF_HEADER, "good-token")
                .header("authorization", "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(validator.called.load(Ordering::SeqCst), 1);
    assert!(!validator.saw_session.load(Ordering::SeqCst));
    assert!(!validator.saw_user.load(Ordering::SeqCst));
}
