use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::batch::{BatchOutcome, BatchRequest};

/// 批次查詢多個站點或分量，每次最多 20 項，並行處理
pub async fn get_batch_data(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchOutcome>, ApiError> {
    let Json(request) = payload?;
    let outcome = state.batch.run(request).await?;
    Ok(Json(outcome))
}
