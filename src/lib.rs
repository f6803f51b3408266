// 模組定義
pub mod analytics;
pub mod api;
pub mod batch;
pub mod cache;
pub mod config;
pub mod domain_types;
pub mod server;
pub mod upstream;
