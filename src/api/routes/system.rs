// src/api/routes/system.rs
use axum::{routing::get, Router};

use crate::api::handlers::system;
use crate::api::state::AppState;

/// 掛載於 API 前綴下的系統路由
pub fn routes() -> Router<AppState> {
    Router::new().route("/cache/stats", get(system::cache_stats))
}

/// 掛載於根路徑的路由
pub fn root_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
}
