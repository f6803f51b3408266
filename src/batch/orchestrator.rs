use futures::future::join_all;
use futures::FutureExt;
use metrics::counter;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::batch::types::{BatchItem, BatchOutcome, BatchRequest};
use crate::cache::{data_key, CacheStore, Partition};
use crate::domain_types::{SeriesQuery, TemporalMode, ValidationError};
use crate::upstream::DataSource;

/// 單一批次請求的項目上限
pub const MAX_BATCH_ITEMS: usize = 20;
/// 每個項目的上游請求逾時
pub const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(30);

/// 批次查詢協調器
///
/// 每個項目各自走「快取 → 上游 → 寫入快取」流程並同時執行，
/// 單一項目的失敗只記錄在 `errors`，不影響其他項目。
pub struct BatchOrchestrator {
    cache: Arc<dyn CacheStore>,
    source: Arc<dyn DataSource>,
    item_timeout: Duration,
}

impl BatchOrchestrator {
    pub fn new(cache: Arc<dyn CacheStore>, source: Arc<dyn DataSource>) -> Self {
        Self {
            cache,
            source,
            item_timeout: DEFAULT_ITEM_TIMEOUT,
        }
    }

    pub fn with_item_timeout(mut self, item_timeout: Duration) -> Self {
        self.item_timeout = item_timeout;
        self
    }

    /// 檢查項目數量與時間參數，回傳共用的時間模式
    pub fn validate(request: &BatchRequest) -> Result<TemporalMode, ValidationError> {
        if request.items.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        if request.items.len() > MAX_BATCH_ITEMS {
            return Err(ValidationError::BatchTooLarge {
                requested: request.items.len(),
                max: MAX_BATCH_ITEMS,
            });
        }

        TemporalMode::from_params(
            request.period.as_deref(),
            request.start_date.as_deref(),
            request.end_date.as_deref(),
        )
    }

    /// 執行批次查詢
    pub async fn run(&self, request: BatchRequest) -> Result<BatchOutcome, ValidationError> {
        let temporal = Self::validate(&request)?;
        let total = request.items.len();
        info!(items = total, domain = %request.domain, temporal = %temporal, "開始批次查詢");

        let tasks = request
            .items
            .iter()
            .map(|item| self.fetch_item(&request.domain, item, &temporal));
        let outcomes = join_all(tasks).await;

        let mut outcome = BatchOutcome::new(total);
        for (key, result) in outcomes {
            outcome.record(key, result);
        }

        counter!("geomag_batch.items").increment(total as u64);
        counter!("geomag_batch.failed").increment(outcome.failed as u64);
        info!(
            successful = outcome.successful,
            failed = outcome.failed,
            "批次查詢完成"
        );

        Ok(outcome)
    }

    async fn fetch_item(
        &self,
        domain: &str,
        item: &BatchItem,
        temporal: &TemporalMode,
    ) -> (String, Result<Arc<Value>, String>) {
        let key = item.batch_key();
        let query = SeriesQuery::new(domain, item.clone(), temporal.clone());
        let cache_key = data_key(&query);
        let partition = Partition::for_mode(temporal);

        if let Some(cached) = self.cache.get(&cache_key, partition) {
            debug!(key = %cache_key, "批次項目命中快取");
            return (key, Ok(cached));
        }

        // 上游 panic 只算該項目失敗
        let fetch = AssertUnwindSafe(self.source.fetch_series(&query)).catch_unwind();

        let result = match timeout(self.item_timeout, fetch).await {
            Ok(Ok(Ok(document))) => {
                let value = Arc::new(Value::Object(document.into_first_object()));
                self.cache.set(&cache_key, value.clone(), partition);
                Ok(value)
            }
            Ok(Ok(Err(err))) => {
                warn!(item = %key, error = %err, "批次項目失敗");
                Err(err.to_string())
            }
            Ok(Err(panic)) => {
                let message = panic_message(panic.as_ref());
                error!(item = %key, error = %message, "批次項目 panic");
                Err(message)
            }
            Err(_) => {
                warn!(item = %key, "批次項目逾時");
                Err(format!(
                    "Request timeout after {} seconds",
                    self.item_timeout.as_secs()
                ))
            }
        };

        (key, result)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::domain_types::SeriesId;
    use crate::upstream::{FetchError, MockDataSource, UpstreamDocument};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde_json::json;

    fn item(station: &str, aspect: &str) -> BatchItem {
        SeriesId::new(station, "magnetic-field-component", "50", "60s", aspect)
    }

    fn request(items: Vec<BatchItem>) -> BatchRequest {
        BatchRequest {
            items,
            period: Some("6h".to_string()),
            start_date: None,
            end_date: None,
            domain: "geomag".to_string(),
        }
    }

    fn cache() -> Arc<ResponseCache> {
        Arc::new(ResponseCache::new(
            Duration::from_secs(300),
            Duration::from_secs(86400),
            100,
        ))
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized_batches() {
        let orchestrator = BatchOrchestrator::new(cache(), Arc::new(MockDataSource::new()));

        assert_eq!(
            orchestrator.run(request(vec![])).await.unwrap_err(),
            ValidationError::EmptyBatch
        );

        let items = (0..21).map(|i| item(&format!("S{}", i), "X")).collect();
        assert_eq!(
            orchestrator.run(request(items)).await.unwrap_err(),
            ValidationError::BatchTooLarge {
                requested: 21,
                max: 20
            }
        );
    }

    #[tokio::test]
    async fn test_requires_temporal_mode() {
        let orchestrator = BatchOrchestrator::new(cache(), Arc::new(MockDataSource::new()));
        let mut req = request(vec![item("EYWM", "X")]);
        req.period = None;
        req.start_date = Some("2025-01-20".to_string());

        assert_eq!(
            orchestrator.run(req).await.unwrap_err(),
            ValidationError::MissingTemporalMode
        );
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated() {
        let mut source = MockDataSource::new();
        source.expect_fetch_series().times(2).returning(|query| {
            if query.series.station == "SMHS" {
                Err(FetchError::NotFound("SMHS".to_string()))
            } else {
                Ok(UpstreamDocument::from(json!([{"station": query.series.station}])))
            }
        });

        let orchestrator = BatchOrchestrator::new(cache(), Arc::new(source));
        let outcome = orchestrator
            .run(request(vec![
                item("EYWM", "X-magnetic-north"),
                item("SMHS", "X-magnetic-north"),
            ]))
            .await
            .unwrap();

        assert_eq!(outcome.total_queries, 2);
        assert_eq!(outcome.successful, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(
            *outcome.results["EYWM_X-magnetic-north"],
            json!({"station": "EYWM"})
        );
        assert_eq!(
            outcome.errors["SMHS_X-magnetic-north"],
            "Resource not found: SMHS"
        );
    }

    #[tokio::test]
    async fn test_results_are_cached_under_data_key() {
        let mut source = MockDataSource::new();
        source
            .expect_fetch_series()
            .times(1)
            .returning(|_| Ok(UpstreamDocument::from(json!([{"data": []}]))));

        let cache = cache();
        let orchestrator = BatchOrchestrator::new(cache.clone(), Arc::new(source));
        let req = request(vec![item("EYWM", "X-magnetic-north")]);

        orchestrator.run(req.clone()).await.unwrap();
        // 第二次完全由快取提供
        let outcome = orchestrator.run(req).await.unwrap();
        assert_eq!(outcome.successful, 1);

        let key = "data:geomag:EYWM:magnetic-field-component:50:60s:X-magnetic-north:latest:6h";
        assert!(cache.get(key, Partition::Latest).is_some());
        assert!(cache.get(key, Partition::Historical).is_none());
    }

    #[tokio::test]
    async fn test_range_uses_historical_partition() {
        let mut source = MockDataSource::new();
        source
            .expect_fetch_series()
            .returning(|_| Ok(UpstreamDocument::from(json!({}))));

        let cache = cache();
        let orchestrator = BatchOrchestrator::new(cache.clone(), Arc::new(source));
        let mut req = request(vec![item("EYWM", "X")]);
        req.period = None;
        req.start_date = Some("2025-01-20".to_string());
        req.end_date = Some("2025-01-21".to_string());

        orchestrator.run(req).await.unwrap();
        let key = "data:geomag:EYWM:magnetic-field-component:50:60s:X:range:2025-01-20:2025-01-21";
        assert!(cache.get(key, Partition::Historical).is_some());
    }

    struct SlowSource;

    #[async_trait]
    impl DataSource for SlowSource {
        async fn fetch_series(&self, query: &SeriesQuery) -> Result<UpstreamDocument, FetchError> {
            if query.series.station == "SLOW" {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(UpstreamDocument::from(json!({"ok": true})))
        }

        async fn fetch_summary(&self, _domain: &str) -> Result<UpstreamDocument, FetchError> {
            Ok(UpstreamDocument::from(json!({})))
        }
    }

    struct PanickySource;

    #[async_trait]
    impl DataSource for PanickySource {
        async fn fetch_series(&self, query: &SeriesQuery) -> Result<UpstreamDocument, FetchError> {
            if query.series.station == "BOOM" {
                panic!("upstream decoder crashed");
            }
            Ok(UpstreamDocument::from(json!({"ok": true})))
        }

        async fn fetch_summary(&self, _domain: &str) -> Result<UpstreamDocument, FetchError> {
            Ok(UpstreamDocument::from(json!({})))
        }
    }

    #[tokio::test]
    async fn test_panicking_item_is_isolated() {
        let cache = cache();
        let orchestrator = BatchOrchestrator::new(cache.clone(), Arc::new(PanickySource));

        let outcome = orchestrator
            .run(request(vec![item("BOOM", "X"), item("EYWM", "X")]))
            .await
            .unwrap();

        assert_eq!(outcome.successful, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.errors["BOOM_X"], "upstream decoder crashed");
        assert_eq!(*outcome.results["EYWM_X"], json!({"ok": true}));
        assert_eq!(cache.stats().latest_cache.size, 1);
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&"owned".to_string()), "owned");
        assert_eq!(panic_message(&42u8), "Unknown panic message");
    }

    #[tokio::test]
    async fn test_item_timeout() {
        let orchestrator = BatchOrchestrator::new(cache(), Arc::new(SlowSource))
            .with_item_timeout(Duration::from_millis(100));

        let outcome = orchestrator
            .run(request(vec![item("SLOW", "X"), item("FAST", "X")]))
            .await
            .unwrap();

        assert_eq!(outcome.successful, 1);
        assert_eq!(outcome.failed, 1);
        assert_matches!(outcome.errors.get("SLOW_X"), Some(msg) if msg.starts_with("Request timeout after"));
    }

    #[tokio::test]
    async fn test_duplicate_keys_counted() {
        let mut source = MockDataSource::new();
        source
            .expect_fetch_series()
            .returning(|query| Ok(UpstreamDocument::from(json!({"name": query.series.name}))));

        let orchestrator = BatchOrchestrator::new(cache(), Arc::new(source));
        let mut second = item("EYWM", "X");
        second.name = "other".to_string();

        let outcome = orchestrator
            .run(request(vec![item("EYWM", "X"), second]))
            .await
            .unwrap();

        assert_eq!(outcome.total_queries, 2);
        assert_eq!(outcome.successful, 1);
        assert_eq!(*outcome.results["EYWM_X"], json!({"name": "other"}));
    }
}
