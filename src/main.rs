use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post, put};
use axum::{Extension, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use pagecraft_api::database::manager::DatabaseManager;
use pagecraft_api::handlers;
use pagecraft_api::middleware::csrf::csrf_guard;
use pagecraft_api::middleware::permissions::{capability_guard, RequiredCapabilities};
use pagecraft_api::middleware::{jwt_auth_middleware, resolve_principal_middleware};
use pagecraft_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = pagecraft_api::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Pagecraft API in {:?} mode", config.environment);

    let pool = DatabaseManager::pool().await.expect("database pool");
    let state = AppState::from_config(config, pool)
        .await
        .expect("application state");

    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Pagecraft API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    let csrf_validator = state.csrf_validator();

    let protected = Router::new()
        .merge(category_routes())
        .merge(section_routes())
        .merge(testimonial_routes())
        .merge(seo_routes())
        .merge(dashboard_routes())
        .merge(upload_routes())
        .layer(axum::middleware::from_fn(resolve_principal_middleware))
        .layer(axum::middleware::from_fn(jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/csrf-token", post(handlers::auth::csrf_token))
        // Protected API
        .merge(protected)
        // Global middleware
        .layer(axum::middleware::from_fn_with_state(csrf_validator, csrf_guard))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Mutating routes carry capability metadata; the guard is layered inside the
/// metadata extension so it sees what the matched route requires.
fn write_guarded(router: Router<AppState>, required: RequiredCapabilities) -> Router<AppState> {
    router
        .route_layer(axum::middleware::from_fn(capability_guard))
        .route_layer(Extension(required))
}

fn category_routes() -> Router<AppState> {
    use pagecraft_api::handlers::categories;

    let reads = Router::new()
        .route("/api/categories", get(categories::list))
        .route("/api/categories/:id", get(categories::get));

    let writes = write_guarded(
        Router::new()
            .route("/api/categories", post(categories::create))
            .route("/api/categories/:id", patch(categories::update)),
        RequiredCapabilities::permissions(&["content.write"]),
    );

    let deletes = write_guarded(
        Router::new().route("/api/categories/:id", delete(categories::delete)),
        RequiredCapabilities::permissions(&["content.delete"]),
    );

    reads.merge(writes).merge(deletes)
}

fn section_routes() -> Router<AppState> {
    use pagecraft_api::handlers::sections;

    let reads = Router::new()
        .route("/api/sections", get(sections::list))
        .route("/api/sections/:id", get(sections::get))
        .route("/api/sections/:id/translations", get(sections::translations));

    let writes = write_guarded(
        Router::new()
            .route("/api/sections", post(sections::create))
            .route("/api/sections/:id", patch(sections::update))
            .route(
                "/api/sections/:id/translations/:locale",
                put(sections::upsert_translation),
            ),
        RequiredCapabilities::permissions(&["content.write"]),
    );

    let deletes = write_guarded(
        Router::new().route("/api/sections/:id", delete(sections::delete)),
        RequiredCapabilities::permissions(&["content.delete"]),
    );

    reads.merge(writes).merge(deletes)
}

fn testimonial_routes() -> Router<AppState> {
    use pagecraft_api::handlers::testimonials;

    let reads = Router::new()
        .route("/api/testimonials", get(testimonials::list))
        .route("/api/testimonials/:id", get(testimonials::get));

    let writes = write_guarded(
        Router::new()
            .route("/api/testimonials", post(testimonials::create))
            .route("/api/testimonials/:id", patch(testimonials::update)),
        RequiredCapabilities::permissions(&["content.write"]),
    );

    let deletes = write_guarded(
        Router::new().route("/api/testimonials/:id", delete(testimonials::delete)),
        RequiredCapabilities::permissions(&["content.delete"]),
    );

    reads.merge(writes).merge(deletes)
}

fn seo_routes() -> Router<AppState> {
    use pagecraft_api::handlers::seo;

    let reads = Router::new()
        .route("/api/seo", get(seo::list))
        .route("/api/seo/:id", get(seo::get));

    let writes = write_guarded(
        Router::new()
            .route("/api/seo", post(seo::create))
            .route("/api/seo/:id", patch(seo::update)),
        RequiredCapabilities::permissions(&["content.write"]),
    );

    let deletes = write_guarded(
        Router::new().route("/api/seo/:id", delete(seo::delete)),
        RequiredCapabilities::permissions(&["content.delete"]),
    );

    reads.merge(writes).merge(deletes)
}

fn dashboard_routes() -> Router<AppState> {
    use pagecraft_api::handlers::dashboard;

    write_guarded(
        Router::new()
            .route("/api/dashboard/stats", get(dashboard::stats))
            .route("/api/dashboard/roles", get(dashboard::roles)),
        RequiredCapabilities::roles(&["ADMIN"]),
    )
}

fn upload_routes() -> Router<AppState> {
    use pagecraft_api::handlers::uploads;

    let max_bytes = pagecraft_api::config::config().upload.max_bytes;

    write_guarded(
        Router::new().route("/api/upload/image", post(uploads::upload_image)),
        RequiredCapabilities::permissions(&["content.write"]),
    )
    // Leave headroom for the multipart framing around the file itself.
    .layer(DefaultBodyLimit::max(max_bytes + 16 * 1024))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "pagecraft-api",
        "version": version,
        "status": "ok"
    }))
}

async fn health() -> axum::response::Json<Value> {
    let database = match DatabaseManager::health_check().await {
        Ok(()) => "up",
        Err(_) => "down",
    };

    axum::response::Json(json!({
        "status": "ok",
        "database": database
    }))
}
