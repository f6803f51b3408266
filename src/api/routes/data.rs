use axum::{routing::get, Router};

use crate::api::handlers::data;
use crate::api::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/data/{station}/{name}/{sensor_code}/{method}/{aspect}/latest/{period}",
            get(data::get_latest_data),
        )
        .route(
            "/data/{station}/{name}/{sensor_code}/{method}/{aspect}/range/{start_date}/{end_date}",
            get(data::get_data_range),
        )
        .route(
            "/data/{station}/{name}/{sensor_code}/{method}/{aspect}/day/{date}",
            get(data::get_data_day),
        )
        .route("/data/{station}/latest/{period}", get(data::get_station_latest_data))
}
