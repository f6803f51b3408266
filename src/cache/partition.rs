use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::cache::metrics::{CacheMetrics, MetricType};
use crate::cache::stats::CacheStats;
use crate::cache::traits::Partition;

/// 時間來源，測試時可替換為手動推進的時鐘
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// 系統單調時鐘
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 手動推進的時鐘
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// 將時鐘往前推進
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

/// 快取項目，插入後不再修改（只會被整筆取代）
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Arc<Value>,
    pub inserted_at: Instant,
    pub expires_at: Instant,
    /// 插入序號，到期時間相同時用於決定驅逐順序
    seq: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
struct PartitionInner {
    entries: FxHashMap<String, CacheEntry>,
    next_seq: u64,
}

impl PartitionInner {
    /// 清除所有過期項目，回傳清除數量
    fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    /// 驅逐最接近到期（其次最早插入）的項目
    fn evict_nearest_expiry(&mut self) -> Option<String> {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.expires_at, entry.seq))
            .map(|(key, _)| key.clone())?;
        self.entries.remove(&victim);
        Some(victim)
    }
}

/// 具 TTL 與容量上限的快取分區
///
/// 過期在讀取時惰性判斷並清除，不使用背景清理任務；
/// 寫入已滿的分區時，先清除過期項目，仍不足時驅逐最接近到期的項目。
pub struct TtlPartition {
    partition: Partition,
    ttl: Duration,
    max_size: usize,
    inner: Mutex<PartitionInner>,
    clock: Arc<dyn Clock>,
}

impl TtlPartition {
    pub fn new(partition: Partition, ttl: Duration, max_size: usize) -> Self {
        Self::with_clock(partition, ttl, max_size, Arc::new(SystemClock))
    }

    pub fn with_clock(
        partition: Partition,
        ttl: Duration,
        max_size: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            partition,
            ttl,
            max_size,
            inner: Mutex::new(PartitionInner::default()),
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn get(&self, key: &str) -> Option<Arc<Value>> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        let expired = match inner.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                CacheMetrics::record(self.partition, MetricType::Hit);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.entries.remove(key);
            CacheMetrics::record(self.partition, MetricType::Expired { count: 1 });
            debug!(partition = %self.partition, key, "快取項目已過期並清除");
        }
        CacheMetrics::record(self.partition, MetricType::Miss);
        None
    }

    pub fn set(&self, key: &str, value: Arc<Value>) {
        if self.max_size == 0 {
            return;
        }

        let now = self.clock.now();
        let mut inner = self.inner.lock();

        if !inner.entries.contains_key(key) && inner.entries.len() >= self.max_size {
            let purged = inner.purge_expired(now);
            let mut evicted = 0;
            while inner.entries.len() >= self.max_size {
                match inner.evict_nearest_expiry() {
                    Some(victim) => {
                        debug!(partition = %self.partition, key = %victim, "快取已滿，驅逐項目");
                        evicted += 1;
                    }
                    None => break,
                }
            }
            if purged > 0 {
                CacheMetrics::record(self.partition, MetricType::Expired { count: purged });
            }
            if evicted > 0 {
                CacheMetrics::record(self.partition, MetricType::Evicted { count: evicted });
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: now,
                expires_at: now + self.ttl,
                seq,
            },
        );
        CacheMetrics::record(self.partition, MetricType::Set);
    }

    /// 清空分區，回傳清除數量
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock();
        let count = inner.entries.len();
        inner.entries.clear();
        CacheMetrics::record_cache_clear(self.partition, count as u64);
        count
    }

    /// 目前有效項目數（順帶清除過期項目）
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        inner.purge_expired(now);
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            maxsize: self.max_size,
            ttl: self.ttl.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn partition(ttl_secs: u64, max_size: usize) -> (TtlPartition, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let partition = TtlPartition::with_clock(
            Partition::Latest,
            Duration::from_secs(ttl_secs),
            max_size,
            clock.clone(),
        );
        (partition, clock)
    }

    #[test]
    fn test_get_set() {
        let (cache, _clock) = partition(300, 10);
        assert!(cache.get("a").is_none());

        cache.set("a", Arc::new(json!({"v": 1})));
        assert_eq!(*cache.get("a").unwrap(), json!({"v": 1}));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_set_replaces_value() {
        let (cache, _clock) = partition(300, 10);
        cache.set("a", Arc::new(json!(1)));
        cache.set("a", Arc::new(json!(2)));
        assert_eq!(*cache.get("a").unwrap(), json!(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_is_purged_on_get() {
        let (cache, clock) = partition(300, 10);
        cache.set("a", Arc::new(json!(1)));

        clock.advance(Duration::from_secs(299));
        assert!(cache.get("a").is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.get("a").is_none());
        // 已從底層儲存中移除，而不只是被忽略
        assert!(!cache.inner.lock().entries.contains_key("a"));
    }

    /// 依指標名稱累計計數（忽略標籤）
    #[derive(Default)]
    struct CountingRecorder {
        counters: Mutex<FxHashMap<String, Arc<AtomicU64>>>,
    }

    impl CountingRecorder {
        fn count(&self, name: &str) -> u64 {
            self.counters
                .lock()
                .get(name)
                .map(|c| c.load(Ordering::Relaxed))
                .unwrap_or(0)
        }
    }

    impl Recorder for CountingRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            let counter = self
                .counters
                .lock()
                .entry(key.name().to_string())
                .or_default()
                .clone();
            Counter::from_arc(counter)
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn test_purge_on_set_counts_as_expired() {
        let recorder = CountingRecorder::default();
        let (cache, clock) = partition(300, 2);

        metrics::with_local_recorder(&recorder, || {
            cache.set("a", Arc::new(json!(1)));
            cache.set("b", Arc::new(json!(2)));
            clock.advance(Duration::from_secs(300));
            // 容量已滿，寫入前先清除兩筆過期項目
            cache.set("c", Arc::new(json!(3)));
        });

        assert_eq!(recorder.count("geomag_cache.expired"), 2);
        assert_eq!(recorder.count("geomag_cache.evicted"), 0);
        assert_eq!(cache.len(), 1);

        metrics::with_local_recorder(&recorder, || {
            cache.set("d", Arc::new(json!(4)));
            cache.set("e", Arc::new(json!(5)));
        });
        assert_eq!(recorder.count("geomag_cache.evicted"), 1);
        assert_eq!(recorder.count("geomag_cache.expired"), 2);
    }

    #[test]
    fn test_capacity_evicts_nearest_expiry() {
        let (cache, clock) = partition(300, 2);
        cache.set("a", Arc::new(json!(1)));
        clock.advance(Duration::from_secs(10));
        cache.set("b", Arc::new(json!(2)));
        clock.advance(Duration::from_secs(10));
        cache.set("c", Arc::new(json!(3)));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_capacity_prefers_expired_entries() {
        let (cache, clock) = partition(100, 3);
        cache.set("a", Arc::new(json!(1)));
        cache.set("b", Arc::new(json!(2)));
        clock.advance(Duration::from_secs(50));
        cache.set("c", Arc::new(json!(3)));
        clock.advance(Duration::from_secs(60));

        // a、b 已過期，c 仍有效
        cache.set("d", Arc::new(json!(4)));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("c").is_some());
        assert!(cache.get("d").is_some());
    }

    #[test]
    fn test_same_expiry_evicts_oldest_inserted() {
        let (cache, _clock) = partition(300, 2);
        cache.set("first", Arc::new(json!(1)));
        cache.set("second", Arc::new(json!(2)));
        cache.set("third", Arc::new(json!(3)));

        assert!(cache.get("first").is_none());
        assert!(cache.get("second").is_some());
        assert!(cache.get("third").is_some());
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let (cache, _clock) = partition(300, 2);
        cache.set("a", Arc::new(json!(1)));
        cache.set("b", Arc::new(json!(2)));
        cache.set("a", Arc::new(json!(10)));

        assert_eq!(cache.len(), 2);
        assert_eq!(*cache.get("a").unwrap(), json!(10));
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let (cache, _clock) = partition(300, 0);
        cache.set("a", Arc::new(json!(1)));
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_and_stats() {
        let (cache, clock) = partition(300, 5);
        cache.set("a", Arc::new(json!(1)));
        cache.set("b", Arc::new(json!(2)));

        assert_eq!(
            cache.stats(),
            CacheStats {
                size: 2,
                maxsize: 5,
                ttl: 300
            }
        );

        clock.advance(Duration::from_secs(300));
        assert_eq!(cache.stats().size, 0);

        cache.set("c", Arc::new(json!(3)));
        assert_eq!(cache.clear(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(TtlPartition::new(
            Partition::Historical,
            Duration::from_secs(60),
            50,
        ));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("k{}", (t * 200 + i) % 80);
                        cache.set(&key, Arc::new(json!(i)));
                        let _ = cache.get(&key);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 50);
    }
}
