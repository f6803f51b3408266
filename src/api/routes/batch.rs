use axum::{routing::post, Router};

use crate::api::handlers::batch;
use crate::api::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/data/batch", post(batch::get_batch_data))
}
