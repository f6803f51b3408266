// domain_types.rs - 領域類型模組
//
// 定義查詢時間序列所需的識別、時間模式與參數驗證。

pub mod series;
pub mod validation;

pub use series::{
    default_domain, format_date, SeriesId, SeriesQuery, TemporalMode, DEFAULT_ASPECT,
    DEFAULT_DOMAIN, DEFAULT_METHOD, DEFAULT_NAME, DEFAULT_SENSOR_CODE,
};
pub use validation::{validate_date, validate_date_range, validate_period, ValidationError, MAX_RANGE_DAYS};
