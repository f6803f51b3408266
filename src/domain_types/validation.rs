//! 查詢參數驗證
//!
//! 所有檢查都在觸及快取或上游之前執行，錯誤訊息直接回傳給客戶端。

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// 日期範圍允許的最大天數（結束日減開始日）
pub const MAX_RANGE_DAYS: i64 = 90;

static PERIOD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[hdms]$").expect("period pattern is valid"));

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// 查詢驗證錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Period cannot be empty")]
    EmptyPeriod,

    #[error("Period must be in format '<number><unit>' where unit is h, d, m, or s")]
    InvalidPeriod(String),

    #[error("Date must be in YYYY-MM-DD format")]
    InvalidDate(String),

    #[error("End date must be after start date")]
    EndBeforeStart,

    #[error("Date range cannot exceed {max} days. Requested range: {requested} days")]
    RangeTooLong { requested: i64, max: i64 },

    #[error("Either 'period' (for latest) or both 'start_date' and 'end_date' (for range) must be provided")]
    MissingTemporalMode,

    #[error("At least one item is required")]
    EmptyBatch,

    #[error("Maximum {max} items allowed per batch request")]
    BatchTooLarge { requested: usize, max: usize },
}

impl ValidationError {
    /// 是否為批次大小錯誤（請求本身格式正確但語義不可處理）
    pub fn is_batch_size(&self) -> bool {
        matches!(self, Self::EmptyBatch | Self::BatchTooLarge { .. })
    }
}

/// 驗證時段字串，例如 `6h`、`7d`
pub fn validate_period(period: &str) -> Result<String, ValidationError> {
    if period.is_empty() {
        return Err(ValidationError::EmptyPeriod);
    }
    if !PERIOD_PATTERN.is_match(period) {
        return Err(ValidationError::InvalidPeriod(period.to_string()));
    }
    Ok(period.to_string())
}

/// 驗證 `YYYY-MM-DD` 日期，並檢查日曆上是否真的存在
pub fn validate_date(date: &str) -> Result<NaiveDate, ValidationError> {
    if !DATE_PATTERN.is_match(date) {
        return Err(ValidationError::InvalidDate(date.to_string()));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(date.to_string()))
}

/// 驗證日期範圍：結束日不得早於開始日，跨度不得超過 [`MAX_RANGE_DAYS`]
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<i64, ValidationError> {
    let span = (end - start).num_days();
    if span < 0 {
        return Err(ValidationError::EndBeforeStart);
    }
    if span > MAX_RANGE_DAYS {
        return Err(ValidationError::RangeTooLong {
            requested: span,
            max: MAX_RANGE_DAYS,
        });
    }
    Ok(span)
}
