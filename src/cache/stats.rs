use serde::Serialize;

/// 單一分區統計信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// 當前快取項目數（不含已過期項目）
    pub size: usize,
    /// 分區容量
    pub maxsize: usize,
    /// 存活時間（秒）
    pub ttl: u64,
}

/// 兩個分區的統計信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiCacheStats {
    /// 最近時段資料快取
    pub latest_cache: CacheStats,
    /// 歷史資料快取
    pub historical_cache: CacheStats,
}
