use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain_types::{default_domain, SeriesId};

/// 批次中的單一序列，輸出鍵為 `{station}_{aspect}`
pub type BatchItem = SeriesId;

/// 批次查詢請求，時間參數由所有項目共用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub items: Vec<BatchItem>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default = "default_domain")]
    pub domain: String,
}

/// 批次查詢結果
///
/// 同一鍵出現多次時，後面的項目覆蓋前面的結果，`total_queries` 仍計入全部項目。
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub results: BTreeMap<String, Arc<Value>>,
    pub errors: BTreeMap<String, String>,
    pub total_queries: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BatchOutcome {
    pub fn new(total_queries: usize) -> Self {
        Self {
            total_queries,
            ..Default::default()
        }
    }

    pub fn record(&mut self, key: String, outcome: Result<Arc<Value>, String>) {
        match outcome {
            Ok(value) => {
                self.results.insert(key, value);
            }
            Err(message) => {
                self.errors.insert(key, message);
            }
        }
        self.successful = self.results.len();
        self.failed = self.errors.len();
    }
}
