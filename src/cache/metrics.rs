use metrics::counter;

use crate::cache::traits::Partition;

/// 監控指標命名空間
pub const METRIC_NAMESPACE: &str = "geomag_cache";

/// 監控指標類型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Hit,
    Miss,
    Set,
    /// 讀取或寫入時清除的過期項目
    Expired { count: usize },
    /// 寫入時因容量不足而驅逐的項目
    Evicted { count: usize },
}

/// 快取監控指標記錄器
pub struct CacheMetrics;

impl CacheMetrics {
    /// 記錄快取指標
    ///
    /// # Arguments
    /// * `partition` - 快取分區
    /// * `metric_type` - 指標類型
    pub fn record(partition: Partition, metric_type: MetricType) {
        let partition = partition.as_str();
        match metric_type {
            MetricType::Hit => {
                counter!(format!("{}.hit", METRIC_NAMESPACE), "partition" => partition).increment(1);
            }
            MetricType::Miss => {
                counter!(format!("{}.miss", METRIC_NAMESPACE), "partition" => partition).increment(1);
            }
            MetricType::Set => {
                counter!(format!("{}.set", METRIC_NAMESPACE), "partition" => partition).increment(1);
            }
            MetricType::Expired { count } => {
                counter!(format!("{}.expired", METRIC_NAMESPACE), "partition" => partition)
                    .increment(count as u64);
            }
            MetricType::Evicted { count } => {
                counter!(format!("{}.evicted", METRIC_NAMESPACE), "partition" => partition)
                    .increment(count as u64);
            }
        }
    }

    /// 記錄快取清理操作
    pub fn record_cache_clear(partition: Partition, count: u64) {
        counter!(format!("{}.clear", METRIC_NAMESPACE), "partition" => partition.as_str())
            .increment(1);
        counter!(
            format!("{}.cleared_entries", METRIC_NAMESPACE),
            "partition" => partition.as_str()
        )
        .increment(count);
    }
}
