use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::validation::{ConfigValidationError, ValidationUtils, Validator};

/// 應用程序配置結構
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub server: ServerConfig,
    pub rest_api: RestApiConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub log: LogConfig,
}

impl Validator for ApplicationConfig {
    fn validate(&self) -> Result<(), ConfigValidationError> {
        // 驗證各個部分的配置
        self.server.validate()?;
        self.rest_api.validate()?;
        self.upstream.validate()?;
        self.cache.validate()?;
        self.log.validate()?;

        Ok(())
    }
}

/// 伺服器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// 監聽位址 `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Validator for ServerConfig {
    fn validate(&self) -> Result<(), ConfigValidationError> {
        ValidationUtils::not_empty(&self.host, "server.host")?;
        ValidationUtils::in_range(self.port, 1, 65535, "server.port")?;

        Ok(())
    }
}

/// REST API 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestApiConfig {
    pub base_path: String,
    /// 整個請求的處理時限（秒）
    pub request_timeout_secs: u64,
    /// 允許的 CORS 來源，`*` 表示任意來源
    pub cors_origin: String,
    pub enable_compression: bool,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        Self {
            base_path: "/api/v1".to_string(),
            request_timeout_secs: 60,
            cors_origin: "*".to_string(),
            enable_compression: true,
        }
    }
}

impl RestApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Validator for RestApiConfig {
    fn validate(&self) -> Result<(), ConfigValidationError> {
        ValidationUtils::not_empty(&self.base_path, "rest_api.base_path")?;
        if !self.base_path.starts_with('/') {
            return Err(ConfigValidationError::InvalidValue(format!(
                "rest_api.base_path 必須以 / 開頭: {}",
                self.base_path
            )));
        }
        ValidationUtils::in_range(self.request_timeout_secs, 1, 600, "rest_api.request_timeout_secs")?;
        ValidationUtils::not_empty(&self.cors_origin, "rest_api.cors_origin")?;

        Ok(())
    }
}

/// 上游資料來源配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tilde.geonet.org.nz/v4".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Validator for UpstreamConfig {
    fn validate(&self) -> Result<(), ConfigValidationError> {
        ValidationUtils::http_url(&self.base_url, "upstream.base_url")?;
        ValidationUtils::in_range(self.timeout_secs, 1, 300, "upstream.timeout_secs")?;

        Ok(())
    }
}

/// 快取配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 最近時段資料存活時間（秒）
    pub ttl_latest_secs: u64,
    /// 歷史資料存活時間（秒）
    pub ttl_historical_secs: u64,
    /// 每個分區的容量
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_latest_secs: 300,
            ttl_historical_secs: 86400,
            max_size: 1000,
        }
    }
}

impl Validator for CacheConfig {
    fn validate(&self) -> Result<(), ConfigValidationError> {
        ValidationUtils::in_range(self.ttl_latest_secs, 1, 86400, "cache.ttl_latest_secs")?;
        ValidationUtils::in_range(
            self.ttl_historical_secs,
            1,
            30 * 86400,
            "cache.ttl_historical_secs",
        )?;
        ValidationUtils::in_range(self.max_size, 1, 1_000_000, "cache.max_size")?;

        Ok(())
    }
}

/// 日誌配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LogConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Validator for LogConfig {
    fn validate(&self) -> Result<(), ConfigValidationError> {
        // 驗證日誌級別
        ValidationUtils::one_of(
            &self.level.to_lowercase(),
            &["trace", "debug", "info", "warn", "error"],
            "log.level",
        )?;

        // 驗證日誌格式
        ValidationUtils::one_of(&self.format.to_lowercase(), &["pretty", "json"], "log.format")?;

        Ok(())
    }
}
