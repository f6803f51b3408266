use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::handlers::{DataResponse, DomainQuery};
use crate::api::state::AppState;
use crate::cache::{station_summary_key, stations_key, summary_key, Partition};

#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Arc<Value>,
}

/// 領域摘要：站點、序列、感測器、方法與分量
pub async fn get_data_summary(
    State(state): State<AppState>,
    Query(params): Query<DomainQuery>,
) -> Result<Json<DataResponse<Arc<Value>>>, ApiError> {
    let summary = load_summary(&state, &params.domain).await?;
    Ok(Json(DataResponse::new(summary)))
}

/// 單一站點摘要，由領域摘要中篩選
pub async fn get_station_data_summary(
    State(state): State<AppState>,
    Path(station): Path<String>,
    Query(params): Query<DomainQuery>,
) -> Result<Json<DataResponse<Arc<Value>>>, ApiError> {
    let domain = params.domain;
    let cache_key = station_summary_key(&domain, &station);
    if let Some(cached) = state.cache.get(&cache_key, Partition::Historical) {
        debug!(key = %cache_key, "命中快取");
        return Ok(Json(DataResponse::new(cached)));
    }

    let summary = load_summary(&state, &domain).await?;
    let info = stations_of(&summary, &domain)
        .and_then(|stations| stations.get(&station))
        .cloned()
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Station '{}' not found in domain '{}'",
                station, domain
            ))
        })?;

    let value = Arc::new(json!({
        "station": info,
        "domain": domain,
        "station_code": station,
    }));
    state.cache.set(&cache_key, value.clone(), Partition::Historical);

    Ok(Json(DataResponse::new(value)))
}

/// 領域內所有站點代碼（排序）
pub async fn get_stations(
    State(state): State<AppState>,
    Query(params): Query<DomainQuery>,
) -> Result<Json<StationsResponse>, ApiError> {
    let cache_key = stations_key(&params.domain);
    if let Some(cached) = state.cache.get(&cache_key, Partition::Historical) {
        debug!(key = %cache_key, "命中快取");
        return Ok(Json(StationsResponse { stations: cached }));
    }

    let summary = load_summary(&state, &params.domain).await?;
    let mut codes: Vec<&String> = stations_of(&summary, &params.domain)
        .map(|stations| stations.keys().collect())
        .unwrap_or_default();
    codes.sort();

    let stations = Arc::new(json!(codes));
    state.cache.set(&cache_key, stations.clone(), Partition::Historical);

    Ok(Json(StationsResponse { stations }))
}

/// 快取優先取得領域摘要
///
/// 摘要以 `dataSummary:{domain}` 存入歷史分區，資料端點的站點中繼資料也由此讀取。
async fn load_summary(state: &AppState, domain: &str) -> Result<Arc<Value>, ApiError> {
    let cache_key = summary_key(domain);
    if let Some(cached) = state.cache.get(&cache_key, Partition::Historical) {
        debug!(key = %cache_key, "命中快取");
        return Ok(cached);
    }

    let summary = Arc::new(state.source.fetch_summary(domain).await?.into_value());
    state.cache.set(&cache_key, summary.clone(), Partition::Historical);
    Ok(summary)
}

/// 摘要中 `domain.{domain}.stations` 物件
fn stations_of<'a>(summary: &'a Value, domain: &str) -> Option<&'a Map<String, Value>> {
    summary.get("domain")?.get(domain)?.get("stations")?.as_object()
}
