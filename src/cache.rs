pub mod keys;
pub mod metrics;
pub mod partition;
pub mod service;
pub mod stats;
pub mod traits;

// Re-export commonly used types
pub use keys::{data_key, station_summary_key, stations_key, stats_key, summary_key, KeyKind};
pub use metrics::{CacheMetrics, MetricType, METRIC_NAMESPACE};
pub use partition::{Clock, ManualClock, SystemClock, TtlPartition};
pub use service::ResponseCache;
pub use stats::{CacheStats, MultiCacheStats};
pub use traits::{CacheStore, Partition};
