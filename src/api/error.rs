use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::any::Any;
use thiserror::Error;
use tracing::{error, warn};

use crate::domain_types::ValidationError;
use crate::upstream::FetchError;

/// API 錯誤類型，只在此處轉換為 HTTP 回應
#[derive(Error, Debug)]
pub enum ApiError {
    /// 參數驗證失敗
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 上游請求失敗
    #[error(transparent)]
    Upstream(#[from] FetchError),

    /// 資源不存在
    #[error("{0}")]
    NotFound(String),

    /// 請求本文無法解析
    #[error("{0}")]
    UnprocessableEntity(String),

    /// 內部錯誤
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// 對應的 HTTP 狀態碼
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(err) if err.is_batch_size() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(err) => match err {
                FetchError::NotFound(_) => StatusCode::NOT_FOUND,
                FetchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                FetchError::Upstream { .. } => StatusCode::BAD_GATEWAY,
                FetchError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                FetchError::Connection(_) => StatusCode::BAD_GATEWAY,
                FetchError::Decode(_) => StatusCode::BAD_GATEWAY,
            },
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Internal(message) => {
                error!(error = %message, "內部錯誤");
                json!({"error": "Internal server error", "detail": message})
            }
            _ => {
                if status.is_server_error() {
                    warn!(status = status.as_u16(), error = %self, "上游請求失敗");
                }
                json!({"detail": self.to_string()})
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::UnprocessableEntity(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// 將處理器中的 panic 轉為 500 回應
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    ApiError::Internal(message).into_response()
}
