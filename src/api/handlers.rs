use serde::{Deserialize, Serialize};

use crate::domain_types::default_domain;

/// 分析端點
pub mod analytics;
/// 批次端點
pub mod batch;
/// 時間序列資料端點
pub mod data;
/// 站點與摘要端點
pub mod discovery;
/// 健康檢查與系統資訊
pub mod system;

/// `{"data": ...}` 回應包裝
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// 只帶 `domain` 的查詢參數
#[derive(Debug, Deserialize)]
pub struct DomainQuery {
    #[serde(default = "default_domain")]
    pub domain: String,
}
