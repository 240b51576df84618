use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use menu_api::database::manager::DatabaseManager;
use menu_api::handlers::{menus, AppState};
use menu_api::middleware::auth::jwt_auth_middleware;
use menu_api::services::role_service::RoleService;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = menu_api::config::config();
    tracing::info!("Starting menu-api in {:?} mode", config.environment);

    if config.database.run_migrations_on_start {
        // A missing or unreachable database is not fatal at boot; /health
        // reports it and the pool retries lazily on first use.
        if let Err(e) = DatabaseManager::run_migrations().await {
            tracing::warn!("could not apply migrations at startup: {}", e);
        }
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("MENU_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("menu-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    let state = AppState {
        roles: Arc::new(RoleService::new()),
    };

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Authenticated menu API
        .merge(menu_routes(state))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn menu_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/menus", get(menus::tree_get).post(menus::menu_post))
        .route("/api/menus/sidebar", get(menus::sidebar_get))
        .route("/api/menus/reorder", patch(menus::reorder_patch))
        .route(
            "/api/menus/:id",
            put(menus::menu_put).delete(menus::menu_delete),
        )
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "menu-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> impl IntoResponse {
    match DatabaseManager::health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "up" })),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "down" })),
            )
        }
    }
}
