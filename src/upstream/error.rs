use serde_json::Value;
use thiserror::Error;

/// 上游資料來源錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    InvalidRequest(String),

    #[error("Upstream API error ({status}): {detail}")]
    Upstream { status: u16, detail: String },

    #[error("Request to Tilde API timed out")]
    Timeout,

    #[error("Failed to connect to Tilde API: {0}")]
    Connection(String),

    #[error("Invalid response from Tilde API: {0}")]
    Decode(String),
}

impl FetchError {
    /// 依 HTTP 狀態碼與回應內容建立錯誤
    ///
    /// 錯誤描述依序取自 JSON 本文的 `detail` 欄位、原始本文文字、狀態碼原因短語。
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => FetchError::NotFound(extract_detail(status, body, "Unknown error")),
            400 => FetchError::InvalidRequest(extract_detail(status, body, "Invalid parameters")),
            _ => FetchError::Upstream {
                status,
                detail: extract_detail(status, body, "Unknown error"),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

fn extract_detail(status: u16, body: &str, fallback: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        match map.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or(fallback)
        .to_string()
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Connection(err.to_string())
        }
    }
}
