// routes.rs
use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{users::users_handler, vaccine::vaccine_handler},
    AppState,
};

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to the VaxLedger vaccination certificate API"
    }))
}

// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/users", users_handler())
        .merge(vaccine_handler())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
        .nest("/api/v1", api_route)
}
