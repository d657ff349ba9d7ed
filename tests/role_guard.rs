//! In-process tests for the capability guard: routes carry their required
//! roles/permissions as metadata and the guard checks them against a
//! principal injected by a test middleware.

use std::collections::HashSet;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Router};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use pagecraft_api::middleware::permissions::{capability_guard, RequiredCapabilities};
use pagecraft_api::middleware::Principal;

fn principal(role: &str, permissions: &[&str]) -> Principal {
    Principal {
        user_id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        role: role.to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect::<HashSet<_>>(),
    }
}

async fn inject_principal(
    Extension(principal): Extension<Principal>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(principal);
    next.run(request).await
}

/// Router mirroring production wiring: metadata via `route_layer(Extension)`
/// with the guard layered inside it.
fn app(principal: Option<Principal>) -> Router {
    let admin_only = Router::new()
        .route("/api/dashboard/stats", get(|| async { "stats" }))
        .route_layer(axum::middleware::from_fn(capability_guard))
        .route_layer(Extension(RequiredCapabilities::roles(&["ADMIN"])));

    let writers = Router::new()
        .route("/api/categories", post(|| async { "created" }))
        .route_layer(axum::middleware::from_fn(capability_guard))
        .route_layer(Extension(RequiredCapabilities::permissions(&["content.write"])));

    let open = Router::new()
        .route("/api/categories", get(|| async { "listed" }))
        .route_layer(axum::middleware::from_fn(capability_guard));

    let router = admin_only.merge(writers).merge(open);

    match principal {
        Some(p) => router
            .layer(axum::middleware::from_fn(inject_principal))
            .layer(Extension(p)),
        None => router,
    }
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn matching_role_passes() {
    let response = app(Some(principal("ADMIN", &[])))
        .oneshot(Request::get("/api/dashboard/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_role_and_no_permission_is_forbidden() {
    let response = app(Some(principal("EDITOR", &["content.read"])))
        .oneshot(Request::get("/api/dashboard/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Insufficient permissions");
    assert_eq!(body["statusCode"], 403);
}

#[tokio::test]
async fn permission_grants_access_without_the_role() {
    let response = app(Some(principal("EDITOR", &["content.write"])))
        .oneshot(Request::post("/api/categories").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_principal_on_guarded_route_is_forbidden() {
    let response = app(None)
        .oneshot(Request::get("/api/dashboard/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Not authenticated");
}

#[tokio::test]
async fn route_without_metadata_passes_unconditionally() {
    let response = app(None)
        .oneshot(Request::get("/api/categories").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
