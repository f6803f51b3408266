// api.rs - API服務模組，宣告子模組
//
// API服務模組提供外部接口，實現：
// - RESTful API接口與路由
// - 參數驗證與錯誤回應
// - 處理器共用狀態

/// REST API實現
pub mod rest;
/// API錯誤與回應轉換
pub mod error;
/// API路由定義
pub mod routes;
/// API處理器模組
pub mod handlers;
/// 處理器共用狀態
pub mod state;

pub use error::ApiError;
pub use rest::RestApi;
pub use state::AppState;
