#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use geomag_gateway::api::{AppState, RestApi};
use geomag_gateway::cache::ResponseCache;
use geomag_gateway::config::RestApiConfig;
use geomag_gateway::domain_types::SeriesQuery;
use geomag_gateway::upstream::{DataSource, FetchError, UpstreamDocument};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// 觸發 panic 的站點代碼
pub const PANIC_STATION: &str = "PANIC";

/// 可設定回應並計數的假資料來源
pub struct FakeSource {
    series: Mutex<HashMap<String, Result<Value, FetchError>>>,
    default_series: Value,
    summary: Mutex<Result<Value, FetchError>>,
    series_calls: AtomicUsize,
    summary_calls: AtomicUsize,
    queries: Mutex<Vec<SeriesQuery>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            series: Mutex::new(HashMap::new()),
            default_series: json!([{"data": []}]),
            summary: Mutex::new(Ok(sample_summary())),
            series_calls: AtomicUsize::new(0),
            summary_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// 所有站點的預設序列回應
    pub fn with_default_series(mut self, value: Value) -> Self {
        self.default_series = value;
        self
    }

    /// 指定站點的序列回應
    pub fn with_series(self, station: &str, response: Result<Value, FetchError>) -> Self {
        self.series.lock().insert(station.to_string(), response);
        self
    }

    pub fn with_summary(self, response: Result<Value, FetchError>) -> Self {
        *self.summary.lock() = response;
        self
    }

    pub fn series_calls(&self) -> usize {
        self.series_calls.load(Ordering::SeqCst)
    }

    pub fn summary_calls(&self) -> usize {
        self.summary_calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<SeriesQuery> {
        self.queries.lock().last().cloned()
    }
}

#[async_trait]
impl DataSource for FakeSource {
    async fn fetch_series(&self, query: &SeriesQuery) -> Result<UpstreamDocument, FetchError> {
        self.series_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.clone());

        if query.series.station == PANIC_STATION {
            panic!("fake upstream exploded");
        }

        let response = self
            .series
            .lock()
            .get(&query.series.station)
            .cloned()
            .unwrap_or_else(|| Ok(self.default_series.clone()));
        response.map(UpstreamDocument::from)
    }

    async fn fetch_summary(&self, _domain: &str) -> Result<UpstreamDocument, FetchError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        self.summary.lock().clone().map(UpstreamDocument::from)
    }
}

/// 兩個站點的領域摘要
pub fn sample_summary() -> Value {
    json!({
        "domain": {
            "geomag": {
                "stations": {
                    "SMHS": {
                        "station": "SMHS",
                        "stationLocality": "Sunnyside",
                        "latitude": -45.87,
                        "longitude": 170.5,
                        "stationElevationM": 50
                    },
                    "EYWM": {
                        "station": "EYWM",
                        "stationLocality": "Eyrewell",
                        "latitude": -43.41,
                        "longitude": 172.35,
                        "stationElevationM": 100
                    }
                }
            }
        }
    })
}

/// 測試用應用與其快取
pub struct TestApp {
    pub router: Router,
    pub cache: Arc<ResponseCache>,
    pub source: Arc<FakeSource>,
}

pub fn test_app(source: FakeSource) -> TestApp {
    test_app_with_timeout(source, Duration::from_secs(30))
}

pub fn test_app_with_timeout(source: FakeSource, batch_item_timeout: Duration) -> TestApp {
    let cache = Arc::new(ResponseCache::default());
    let source = Arc::new(source);
    let state = AppState::new(cache.clone(), source.clone()).with_batch_item_timeout(batch_item_timeout);
    let router = RestApi::new(RestApiConfig::default()).build_app(state);

    TestApp {
        router,
        cache,
        source,
    }
}

/// 送出請求並解析 JSON 回應
pub async fn send_request(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

pub async fn get_request(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send_request(router, request).await
}

pub async fn post_json_request(router: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw_request(router, uri, body.to_string()).await
}

pub async fn post_raw_request(router: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    send_request(router, request).await
}

pub fn approx(a: &Value, expected: f64) -> bool {
    a.as_f64().map(|v| (v - expected).abs() < 1e-9).unwrap_or(false)
}
