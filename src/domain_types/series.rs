//! 地磁時間序列查詢

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::validation::{validate_date, validate_date_range, validate_period, ValidationError};

/// 預設資料領域
pub const DEFAULT_DOMAIN: &str = "geomag";

/// 便利端點使用的預設序列
pub const DEFAULT_NAME: &str = "magnetic-field-component";
pub const DEFAULT_SENSOR_CODE: &str = "50";
pub const DEFAULT_METHOD: &str = "60s";
pub const DEFAULT_ASPECT: &str = "X-magnetic-north";

pub fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

/// 唯一識別一條可觀測時間序列：(站點, 名稱, 感測器代碼, 方法, 分量)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesId {
    pub station: String,
    pub name: String,
    pub sensor_code: String,
    pub method: String,
    pub aspect: String,
}

impl SeriesId {
    pub fn new(
        station: impl Into<String>,
        name: impl Into<String>,
        sensor_code: impl Into<String>,
        method: impl Into<String>,
        aspect: impl Into<String>,
    ) -> Self {
        Self {
            station: station.into(),
            name: name.into(),
            sensor_code: sensor_code.into(),
            method: method.into(),
            aspect: aspect.into(),
        }
    }

    /// 批次結果中使用的組合鍵 `{station}_{aspect}`
    pub fn batch_key(&self) -> String {
        format!("{}_{}", self.station, self.aspect)
    }
}

/// 查詢的時間模式：最近時段或明確的日期範圍（含首尾）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemporalMode {
    Period(String),
    Range { start: NaiveDate, end: NaiveDate },
}

impl TemporalMode {
    /// 由已驗證的時段建立
    pub fn period(period: &str) -> Result<Self, ValidationError> {
        Ok(Self::Period(validate_period(period)?))
    }

    /// 由日期字串建立範圍，並套用範圍跨度限制
    pub fn range(start: &str, end: &str) -> Result<Self, ValidationError> {
        let start = validate_date(start)?;
        let end = validate_date(end)?;
        validate_date_range(start, end)?;
        Ok(Self::Range { start, end })
    }

    /// 由可選的查詢參數決定時間模式
    ///
    /// `period` 優先；否則需要同時提供開始與結束日期。空字串視同未提供。
    /// 此處只驗證格式，不套用範圍跨度限制。
    pub fn from_params(
        period: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, ValidationError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.filter(|s| !s.is_empty())
        }

        if let Some(period) = present(period) {
            return Self::period(period);
        }

        match (present(start_date), present(end_date)) {
            (Some(start), Some(end)) => Ok(Self::Range {
                start: validate_date(start)?,
                end: validate_date(end)?,
            }),
            _ => Err(ValidationError::MissingTemporalMode),
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Period(_))
    }
}

impl fmt::Display for TemporalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Period(period) => write!(f, "latest/{}", period),
            Self::Range { start, end } => write!(f, "{}/{}", format_date(start), format_date(end)),
        }
    }
}

/// 以 `YYYY-MM-DD` 輸出日期
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 單一序列的完整查詢
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesQuery {
    pub domain: String,
    pub series: SeriesId,
    pub temporal: TemporalMode,
}

impl SeriesQuery {
    pub fn new(domain: impl Into<String>, series: SeriesId, temporal: TemporalMode) -> Self {
        Self {
            domain: domain.into(),
            series,
            temporal,
        }
    }
}
