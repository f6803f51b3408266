use axum::{routing::get, Router};

use crate::api::handlers::analytics;
use crate::api::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/data/{station}/{name}/{sensor_code}/{method}/{aspect}/stats",
        get(analytics::get_data_statistics),
    )
}
