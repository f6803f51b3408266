use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cache::partition::{Clock, SystemClock, TtlPartition};
use crate::cache::stats::MultiCacheStats;
use crate::cache::traits::{CacheStore, Partition};
use crate::config::CacheConfig;

/// 雙分區回應快取
///
/// `latest` 分區以短 TTL 存放最近時段查詢，`historical` 分區以長 TTL
/// 存放日期範圍、統計與摘要查詢。兩個分區各自加鎖，互不影響。
pub struct ResponseCache {
    latest: TtlPartition,
    historical: TtlPartition,
}

impl ResponseCache {
    /// 創建新的回應快取
    ///
    /// # Arguments
    /// * `ttl_latest` - 最近時段資料存活時間
    /// * `ttl_historical` - 歷史資料存活時間
    /// * `max_size` - 每個分區的容量
    pub fn new(ttl_latest: Duration, ttl_historical: Duration, max_size: usize) -> Self {
        Self::with_clock(ttl_latest, ttl_historical, max_size, Arc::new(SystemClock))
    }

    pub fn with_clock(
        ttl_latest: Duration,
        ttl_historical: Duration,
        max_size: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            latest: TtlPartition::with_clock(Partition::Latest, ttl_latest, max_size, clock.clone()),
            historical: TtlPartition::with_clock(
                Partition::Historical,
                ttl_historical,
                max_size,
                clock,
            ),
        }
    }

    /// 由配置建立
    pub fn from_config(config: &CacheConfig) -> Self {
        info!(
            ttl_latest = config.ttl_latest_secs,
            ttl_historical = config.ttl_historical_secs,
            max_size = config.max_size,
            "初始化回應快取"
        );
        Self::new(
            Duration::from_secs(config.ttl_latest_secs),
            Duration::from_secs(config.ttl_historical_secs),
            config.max_size,
        )
    }

    fn partition(&self, partition: Partition) -> &TtlPartition {
        match partition {
            Partition::Latest => &self.latest,
            Partition::Historical => &self.historical,
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl CacheStore for ResponseCache {
    fn get(&self, key: &str, partition: Partition) -> Option<Arc<Value>> {
        self.partition(partition).get(key)
    }

    fn set(&self, key: &str, value: Arc<Value>, partition: Partition) {
        self.partition(partition).set(key, value);
    }

    fn clear(&self) {
        let latest = self.latest.clear();
        let historical = self.historical.clear();
        info!(latest, historical, "已清空回應快取");
    }

    fn stats(&self) -> MultiCacheStats {
        MultiCacheStats {
            latest_cache: self.latest.stats(),
            historical_cache: self.historical.stats(),
        }
    }
}
