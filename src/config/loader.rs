use config::{Config, ConfigError, Environment as ConfigEnvironment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::config::types::ApplicationConfig;

/// 環境變數前綴，例如 `GEOMAG__SERVER__PORT`
pub const ENV_PREFIX: &str = "GEOMAG";

/// 相容舊部署方式的扁平環境變數與對應的配置鍵
pub const LEGACY_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("TILDE_BASE_URL", "upstream.base_url"),
    ("TILDE_TIMEOUT_SECS", "upstream.timeout_secs"),
    ("CACHE_TTL_LATEST", "cache.ttl_latest_secs"),
    ("CACHE_TTL_HISTORICAL", "cache.ttl_historical_secs"),
    ("CACHE_MAX_SIZE", "cache.max_size"),
    ("WEB_ORIGIN", "rest_api.cors_origin"),
    ("API_PORT", "server.port"),
];

/// 環境類型枚舉
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// 從環境變數取得當前環境設定
    pub fn from_env() -> Self {
        match env::var("GEOMAG_ENV")
            .unwrap_or_else(|_| "development".into())
            .to_lowercase()
            .as_str()
        {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// 轉換為配置文件名
    pub fn as_filename(&self) -> &'static str {
        match self {
            Environment::Development => "development.toml",
            Environment::Production => "production.toml",
        }
    }
}

/// 配置加載器，負責根據環境加載適當的配置
///
/// 優先級由低到高：內建預設值、環境配置文件（可不存在）、`GEOMAG__*` 環境變數、舊版扁平環境變數。
pub struct ConfigLoader;

impl ConfigLoader {
    /// 載入指定環境的配置
    pub fn load(env: Environment) -> Result<Config, ConfigError> {
        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into());
        let config_path = Path::new(&config_dir).join(env.as_filename());

        let mut config_builder = Config::builder();

        // 內建預設值
        config_builder = config_builder.add_source(Config::try_from(&ApplicationConfig::default())?);

        // 加載環境特定配置
        config_builder = config_builder.add_source(File::from(config_path).required(false));

        // 從環境變數加載配置（優先級高於文件配置）
        config_builder = config_builder.add_source(
            ConfigEnvironment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in LEGACY_ENV_OVERRIDES {
            let value = env::var(var).ok().filter(|v| !v.trim().is_empty());
            config_builder = config_builder.set_override_option(*key, value)?;
        }

        // 構建最終配置
        config_builder.build()
    }

    /// 載入當前環境的配置
    pub fn load_current() -> Result<Config, ConfigError> {
        Self::load(Environment::from_env())
    }
}

/// 配置獲取輔助特性
pub trait ConfigExt {
    /// 從配置中獲取並反序列化指定部分
    fn get_section<'a, T: Deserialize<'a>>(&'a self, section: &str) -> Result<T, ConfigError>;
}

impl ConfigExt for Config {
    fn get_section<'a, T: Deserialize<'a>>(&'a self, section: &str) -> Result<T, ConfigError> {
        self.get(section)
    }
}
