use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::analytics::calculate_statistics;
use crate::api::error::ApiError;
use crate::api::handlers::DataResponse;
use crate::api::state::AppState;
use crate::cache::{stats_key, Partition};
use crate::domain_types::{default_domain, SeriesId, SeriesQuery, TemporalMode};

#[derive(Debug, Deserialize)]
pub struct SeriesPath {
    pub station: String,
    pub name: String,
    pub sensor_code: String,
    pub method: String,
    pub aspect: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default = "default_domain")]
    pub domain: String,
}

/// 回應中回顯的查詢參數
#[derive(Debug, Serialize)]
pub struct StatsQueryEcho {
    pub station: String,
    pub name: String,
    pub sensor_code: String,
    pub method: String,
    pub aspect: String,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// 序列統計（最小、最大、平均、標準差）
///
/// 需要 `period`，或同時提供 `start_date` 與 `end_date`；兩者皆有時以 `period` 為準。
pub async fn get_data_statistics(
    State(state): State<AppState>,
    Path(path): Path<SeriesPath>,
    Query(params): Query<StatsParams>,
) -> Result<Json<DataResponse<Arc<Value>>>, ApiError> {
    let temporal = TemporalMode::from_params(
        params.period.as_deref(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    )?;

    let echo = StatsQueryEcho {
        station: path.station.clone(),
        name: path.name.clone(),
        sensor_code: path.sensor_code.clone(),
        method: path.method.clone(),
        aspect: path.aspect.clone(),
        period: params.period,
        start_date: params.start_date,
        end_date: params.end_date,
    };

    let series = SeriesId::new(path.station, path.name, path.sensor_code, path.method, path.aspect);
    let query = SeriesQuery::new(params.domain, series, temporal);
    let cache_key = stats_key(&query);
    let partition = Partition::for_mode(&query.temporal);

    if let Some(cached) = state.cache.get(&cache_key, partition) {
        debug!(key = %cache_key, %partition, "命中快取");
        return Ok(Json(DataResponse::new(cached)));
    }

    let mut document = state.source.fetch_series(&query).await?.into_first_object();
    let statistics = match document.get("data") {
        Some(Value::Array(points)) => calculate_statistics(points),
        _ => calculate_statistics(&[]),
    };
    debug!(key = %cache_key, count = statistics.count, "統計計算完成");

    document.insert("statistics".to_string(), serde_json::to_value(&statistics)?);
    document.insert("query".to_string(), serde_json::to_value(&echo)?);

    let value = Arc::new(Value::Object(document));
    state.cache.set(&cache_key, value.clone(), partition);

    Ok(Json(DataResponse::new(value)))
}
