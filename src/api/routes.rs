use axum::Router;

use crate::api::state::AppState;

pub mod analytics;
pub mod batch;
pub mod data;
pub mod discovery;
pub mod system;

/// 掛載於 `rest_api.base_path` 之下的路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(discovery::routes())
        .merge(data::routes())
        .merge(analytics::routes())
        .merge(batch::routes())
        .merge(system::routes())
}
