use serde_json::{Map, Value};

/// 上游回應文件
///
/// 上游可能回傳物件或陣列，呼叫後只做一次正規化。
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamDocument {
    List(Vec<Value>),
    Object(Map<String, Value>),
}

impl From<Value> for UpstreamDocument {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => UpstreamDocument::List(items),
            Value::Object(map) => UpstreamDocument::Object(map),
            // 純量本文視為空物件
            _ => UpstreamDocument::Object(Map::new()),
        }
    }
}

impl UpstreamDocument {
    /// 資料端點的正規化
    ///
    /// 多筆陣列包裝為 `{"items": [...]}`；單筆陣列取出該元素；空陣列為 `{}`。
    pub fn into_payload(self) -> Map<String, Value> {
        match self {
            UpstreamDocument::Object(map) => map,
            UpstreamDocument::List(mut items) => match items.len() {
                0 => Map::new(),
                1 => as_object(items.remove(0)),
                _ => {
                    let mut map = Map::new();
                    map.insert("items".to_string(), Value::Array(items));
                    map
                }
            },
        }
    }

    /// 統計與批次使用的正規化：取第一個元素
    pub fn into_first_object(self) -> Map<String, Value> {
        match self {
            UpstreamDocument::Object(map) => map,
            UpstreamDocument::List(items) => items.into_iter().next().map(as_object).unwrap_or_default(),
        }
    }

    /// 原始 JSON 值
    pub fn into_value(self) -> Value {
        match self {
            UpstreamDocument::List(items) => Value::Array(items),
            UpstreamDocument::Object(map) => Value::Object(map),
        }
    }
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
