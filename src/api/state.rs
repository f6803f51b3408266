use std::sync::Arc;
use std::time::Duration;

use crate::batch::BatchOrchestrator;
use crate::cache::CacheStore;
use crate::upstream::DataSource;

/// 處理器共用狀態，由行程根部建立後注入
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn CacheStore>,
    pub source: Arc<dyn DataSource>,
    pub batch: Arc<BatchOrchestrator>,
}

impl AppState {
    pub fn new(cache: Arc<dyn CacheStore>, source: Arc<dyn DataSource>) -> Self {
        let batch = Arc::new(BatchOrchestrator::new(cache.clone(), source.clone()));
        Self {
            cache,
            source,
            batch,
        }
    }

    /// 調整批次項目逾時
    pub fn with_batch_item_timeout(mut self, item_timeout: Duration) -> Self {
        self.batch = Arc::new(
            BatchOrchestrator::new(self.cache.clone(), self.source.clone())
                .with_item_timeout(item_timeout),
        );
        self
    }
}
