use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use serde::Serialize;

use crate::api::state::AppState;

/// 服務名稱
pub const SERVICE_NAME: &str = "geomag-api";
/// 對外顯示的 API 名稱
pub const API_TITLE: &str = "GeoNet Geomag API";

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
}

#[derive(Serialize)]
pub struct RootResponse {
    service: String,
    version: String,
    health: String,
}

pub async fn health() -> impl IntoResponse {
    let health_response = HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    };

    Json(health_response)
}

pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        service: API_TITLE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        health: "/health".to_string(),
    })
}

/// 各快取分區的大小、容量與 TTL
pub async fn cache_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.cache.stats())
}
