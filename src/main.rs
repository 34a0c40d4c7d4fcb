use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use gardrop_api::config;
use gardrop_api::database::manager::DatabaseManager;
use gardrop_api::handlers;
use gardrop_api::middleware::{jwt_auth_middleware, require_admin_middleware, route_gate_middleware};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, GARDROP_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Gardrop API in {:?} mode", config.environment);

    // Schema is versioned with the binary; a failed migration leaves the
    // health endpoint reporting degraded rather than refusing to start.
    if let Err(e) = DatabaseManager::migrate().await {
        tracing::warn!("Migrations not applied: {}", e);
    }

    let app = app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Gardrop API listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server");
}

fn app() -> Router {
    let storage_root = &config::config().storage.root_dir;
    let upload_limit = config::config().storage.max_upload_bytes;

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Authenticated API
        .merge(protected_routes())
        .merge(admin_routes())
        // Uploaded post images
        .nest_service("/media", ServeDir::new(storage_root))
        // Global middleware
        .layer(axum::middleware::from_fn(route_gate_middleware))
        .layer(DefaultBodyLimit::max(upload_limit + 64 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::products;
    use handlers::public::{auth, clicks, feed, profile};

    Router::new()
        // Account creation and login
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Public reads
        .route("/api/profiles/:username", get(profile::get))
        .route("/api/feed", get(feed::get))
        // GET is public; POST (tag creation) carries its own auth layer so
        // the two methods can share the nested path
        .route(
            "/api/posts/:id/products",
            post(products::create)
                .route_layer(axum::middleware::from_fn(jwt_auth_middleware))
                .get(feed::post_products),
        )
        // Click tracking
        .route("/api/products/:id/click", post(clicks::record))
        .route("/r/:id", get(clicks::redirect))
}

fn protected_routes() -> Router {
    use axum::routing::{patch, post};
    use handlers::protected::{analytics, auth, posts, products, quota, uploads};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/auth/profile", patch(auth::update_profile))
        .route("/api/uploads", post(uploads::create))
        .route("/api/posts", get(posts::list).post(posts::create))
        .route(
            "/api/posts/:id",
            get(posts::get).patch(posts::update).delete(posts::delete),
        )
        .route("/api/posts/:id/products/all", get(products::list_for_post))
        .route(
            "/api/products/:id",
            patch(products::update).delete(products::delete),
        )
        .route("/api/analytics", get(analytics::get))
        .route("/api/stats", get(analytics::stats))
        .route("/api/quota", get(quota::get))
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware))
}

fn admin_routes() -> Router {
    use axum::routing::{delete, patch};
    use handlers::admin::{plans, posts, stats, users};

    Router::new()
        .route("/api/admin/stats", get(stats::get))
        .route("/api/admin/users", get(users::list))
        .route("/api/admin/users/:id", patch(users::update))
        .route("/api/admin/posts", get(posts::list))
        .route("/api/admin/posts/:id", delete(posts::delete))
        .route("/api/admin/plans", get(plans::list).post(plans::create))
        .route("/api/admin/plans/:id", patch(plans::update))
        .route_layer(axum::middleware::from_fn(require_admin_middleware))
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Gardrop API",
            "version": version,
            "description": "Photo posts with pixel-anchored affiliate product tags",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login (public)",
                "profiles": "/api/profiles/:username (public)",
                "feed": "/api/feed (public)",
                "clicks": "/api/products/:id/click, /r/:id (public)",
                "posts": "/api/posts[/:id] (protected)",
                "products": "/api/posts/:id/products (POST), /api/products/:id (protected)",
                "uploads": "/api/uploads (protected)",
                "analytics": "/api/analytics, /api/stats, /api/quota (protected)",
                "admin": "/api/admin/* (admin role)",
                "media": "/media/* (public, uploaded images)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
