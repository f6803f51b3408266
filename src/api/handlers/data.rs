use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::handlers::{DataResponse, DomainQuery};
use crate::api::state::AppState;
use crate::cache::{data_key, summary_key, CacheStore, Partition};
use crate::domain_types::{
    default_domain, SeriesId, SeriesQuery, TemporalMode, DEFAULT_ASPECT, DEFAULT_METHOD,
    DEFAULT_NAME, DEFAULT_SENSOR_CODE,
};

#[derive(Debug, Deserialize)]
pub struct LatestPath {
    pub station: String,
    pub name: String,
    pub sensor_code: String,
    pub method: String,
    pub aspect: String,
    pub period: String,
}

#[derive(Debug, Deserialize)]
pub struct RangePath {
    pub station: String,
    pub name: String,
    pub sensor_code: String,
    pub method: String,
    pub aspect: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct DayPath {
    pub station: String,
    pub name: String,
    pub sensor_code: String,
    pub method: String,
    pub aspect: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct StationLatestPath {
    pub station: String,
    pub period: String,
}

/// 便利端點的序列覆寫參數
#[derive(Debug, Deserialize)]
pub struct SeriesDefaults {
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_sensor_code")]
    pub sensor_code: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_aspect")]
    pub aspect: String,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_sensor_code() -> String {
    DEFAULT_SENSOR_CODE.to_string()
}

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

fn default_aspect() -> String {
    DEFAULT_ASPECT.to_string()
}

type DataResult = Result<Json<DataResponse<Arc<Value>>>, ApiError>;

/// 最近時段資料
pub async fn get_latest_data(
    State(state): State<AppState>,
    Path(path): Path<LatestPath>,
    Query(params): Query<DomainQuery>,
) -> DataResult {
    let temporal = TemporalMode::period(&path.period)?;
    let series = SeriesId::new(path.station, path.name, path.sensor_code, path.method, path.aspect);
    serve_series(&state, SeriesQuery::new(params.domain, series, temporal)).await
}

/// 日期範圍資料（含首尾，最長 90 天）
pub async fn get_data_range(
    State(state): State<AppState>,
    Path(path): Path<RangePath>,
    Query(params): Query<DomainQuery>,
) -> DataResult {
    let temporal = TemporalMode::range(&path.start_date, &path.end_date)?;
    let series = SeriesId::new(path.station, path.name, path.sensor_code, path.method, path.aspect);
    serve_series(&state, SeriesQuery::new(params.domain, series, temporal)).await
}

/// 單日資料，等同開始與結束日期相同的範圍查詢
pub async fn get_data_day(
    State(state): State<AppState>,
    Path(path): Path<DayPath>,
    Query(params): Query<DomainQuery>,
) -> DataResult {
    let temporal = TemporalMode::range(&path.date, &path.date)?;
    let series = SeriesId::new(path.station, path.name, path.sensor_code, path.method, path.aspect);
    serve_series(&state, SeriesQuery::new(params.domain, series, temporal)).await
}

/// 使用預設序列的站點最近資料
pub async fn get_station_latest_data(
    State(state): State<AppState>,
    Path(path): Path<StationLatestPath>,
    Query(params): Query<SeriesDefaults>,
) -> DataResult {
    let temporal = TemporalMode::period(&path.period)?;
    let series = SeriesId::new(
        path.station,
        params.name,
        params.sensor_code,
        params.method,
        params.aspect,
    );
    serve_series(&state, SeriesQuery::new(params.domain, series, temporal)).await
}

/// 快取優先的序列查詢，未命中時請求上游並附加站點中繼資料
async fn serve_series(state: &AppState, query: SeriesQuery) -> DataResult {
    let cache_key = data_key(&query);
    let partition = Partition::for_mode(&query.temporal);

    if let Some(cached) = state.cache.get(&cache_key, partition) {
        debug!(key = %cache_key, %partition, "命中快取");
        return Ok(Json(DataResponse::new(cached)));
    }

    let mut payload = state.source.fetch_series(&query).await?.into_payload();
    enrich_with_station_metadata(
        state.cache.as_ref(),
        &query.domain,
        &query.series.station,
        &mut payload,
    );

    let value = Arc::new(Value::Object(payload));
    state.cache.set(&cache_key, value.clone(), partition);
    debug!(key = %cache_key, %partition, "已寫入快取");

    Ok(Json(DataResponse::new(value)))
}

/// 若快取中有領域摘要且包含該站點，附加 `station_metadata`
///
/// 只讀取快取，不會觸發上游請求；結構不符時直接略過。
pub fn enrich_with_station_metadata(
    cache: &dyn CacheStore,
    domain: &str,
    station: &str,
    payload: &mut Map<String, Value>,
) {
    let Some(summary) = cache.get(&summary_key(domain), Partition::Historical) else {
        return;
    };

    match station_metadata(&summary, domain, station) {
        Some(metadata) => {
            payload.insert("station_metadata".to_string(), metadata);
        }
        None => debug!(domain, station, "摘要中沒有站點資訊，略過中繼資料"),
    }
}

/// 從領域摘要 `domain.{domain}.stations.{station}` 取出站點中繼資料
pub fn station_metadata(summary: &Value, domain: &str, station: &str) -> Option<Value> {
    let info = summary
        .get("domain")?
        .get(domain)?
        .get("stations")?
        .get(station)?
        .as_object()
        .filter(|info| !info.is_empty())?;

    Some(json!({
        "station": info.get("station"),
        "locality": info.get("stationLocality"),
        "latitude": info.get("latitude"),
        "longitude": info.get("longitude"),
        "elevationM": info.get("stationElevationM"),
    }))
}
