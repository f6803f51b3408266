/// 上游 Tilde v4 資料來源
pub mod client;
pub mod document;
pub mod error;

pub use client::{DataSource, TildeClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use document::UpstreamDocument;
pub use error::FetchError;

#[cfg(test)]
pub use client::MockDataSource;
