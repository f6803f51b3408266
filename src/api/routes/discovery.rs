use axum::{routing::get, Router};

use crate::api::handlers::discovery;
use crate::api::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dataSummary", get(discovery::get_data_summary))
        .route("/dataSummary/{station}", get(discovery::get_station_data_summary))
        .route("/stations", get(discovery::get_stations))
}
