use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::cache::stats::MultiCacheStats;
use crate::domain_types::TemporalMode;

/// 快取分區
///
/// 最近時段查詢使用短 TTL 的 `Latest`；日期範圍、單日與摘要查詢使用長 TTL 的 `Historical`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Latest,
    Historical,
}

impl Partition {
    /// 依時間模式選擇分區
    pub fn for_mode(mode: &TemporalMode) -> Self {
        if mode.is_latest() {
            Partition::Latest
        } else {
            Partition::Historical
        }
    }

    /// 監控指標與日誌使用的名稱
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Latest => "latest",
            Partition::Historical => "historical",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 回應快取介面
///
/// 由行程根部建立並以 `Arc<dyn CacheStore>` 注入處理器，測試時可替換。
/// 實作必須可在多個並行請求間安全共用；相同鍵的並行寫入以最後寫入為準。
pub trait CacheStore: Send + Sync + 'static {
    /// 讀取快取，過期項目視為不存在並被清除
    fn get(&self, key: &str, partition: Partition) -> Option<Arc<Value>>;

    /// 寫入快取，分區已滿時先驅逐再插入
    fn set(&self, key: &str, value: Arc<Value>, partition: Partition);

    /// 清空所有分區
    fn clear(&self);

    /// 各分區的統計資訊
    fn stats(&self) -> MultiCacheStats;
}
