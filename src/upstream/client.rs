use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::UpstreamConfig;
use crate::domain_types::{format_date, SeriesQuery, TemporalMode};
use crate::upstream::document::UpstreamDocument;
use crate::upstream::error::FetchError;

/// 上游預設位址
pub const DEFAULT_BASE_URL: &str = "https://tilde.geonet.org.nz/v4";
/// 上游請求預設逾時（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 時間序列資料來源
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// 取得單一序列在指定時間模式下的觀測資料
    async fn fetch_series(&self, query: &SeriesQuery) -> Result<UpstreamDocument, FetchError>;

    /// 取得領域摘要（站點清單與中繼資料）
    async fn fetch_summary(&self, domain: &str) -> Result<UpstreamDocument, FetchError>;
}

/// Tilde v4 HTTP 客戶端
///
/// 整個行程共用一個連線池，關閉後的請求一律回傳 `Connection("client closed")`。
pub struct TildeClient {
    base_url: String,
    timeout: Duration,
    client: RwLock<Option<reqwest::Client>>,
}

impl TildeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: RwLock::new(Some(client)),
        })
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, FetchError> {
        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout_secs,
            "初始化上游客戶端"
        );
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 以 `/` 連接非空路徑片段
    pub fn build_url(&self, parts: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for part in parts {
            let part = part.trim_matches('/');
            if part.is_empty() {
                continue;
            }
            url.push('/');
            url.push_str(part);
        }
        url
    }

    /// 序列查詢對應的上游位址
    pub fn series_url(&self, query: &SeriesQuery) -> String {
        let temporal = match &query.temporal {
            TemporalMode::Period(period) => ["latest".to_string(), period.clone()],
            TemporalMode::Range { start, end } => [format_date(start), format_date(end)],
        };

        let series = &query.series;
        let parts = [
            "data",
            query.domain.as_str(),
            series.station.as_str(),
            series.name.as_str(),
            series.sensor_code.as_str(),
            series.method.as_str(),
            series.aspect.as_str(),
            temporal[0].as_str(),
            temporal[1].as_str(),
        ];
        self.build_url(&parts)
    }

    /// 關閉連線池
    pub fn close(&self) {
        if self.client.write().take().is_some() {
            info!("上游客戶端已關閉");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.client.read().is_none()
    }

    async fn get_json(&self, url: &str) -> Result<UpstreamDocument, FetchError> {
        let client = self
            .client
            .read()
            .clone()
            .ok_or_else(|| FetchError::Connection("client closed".to_string()))?;

        debug!(url, "請求上游資料");
        let response = client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = FetchError::from_status(status.as_u16(), &body);
            warn!(url, status = status.as_u16(), error = %err, "上游回應錯誤");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(UpstreamDocument::from(value))
    }
}

#[async_trait]
impl DataSource for TildeClient {
    async fn fetch_series(&self, query: &SeriesQuery) -> Result<UpstreamDocument, FetchError> {
        let url = self.series_url(query);
        self.get_json(&url).await
    }

    async fn fetch_summary(&self, domain: &str) -> Result<UpstreamDocument, FetchError> {
        let url = self.build_url(&["dataSummary", domain]);
        self.get_json(&url).await
    }
}
