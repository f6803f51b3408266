use thiserror::Error;

/// 配置驗證錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("缺少必要配置項: {0}")]
    MissingField(String),

    #[error("無效的配置值: {0}")]
    InvalidValue(String),

    #[error("配置範圍錯誤: {field} 的值 {value} 不在範圍 {min}..{max} 內")]
    RangeError {
        field: String,
        value: String,
        min: String,
        max: String,
    },
}

/// 配置驗證器trait
pub trait Validator {
    /// 驗證配置
    fn validate(&self) -> Result<(), ConfigValidationError>;
}

/// 驗證配置區段
pub fn validate_config<T>(config: &T) -> Result<(), ConfigValidationError>
where
    T: Validator,
{
    config.validate()
}

/// 驗證工具函數
pub struct ValidationUtils;

impl ValidationUtils {
    /// 驗證配置值是否在指定範圍內
    pub fn in_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<(), ConfigValidationError>
    where
        T: PartialOrd + ToString,
    {
        if value < min || value > max {
            return Err(ConfigValidationError::RangeError {
                field: field_name.to_string(),
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(())
    }

    /// 驗證一個選項是否為某些值中的一個
    pub fn one_of(value: &str, options: &[&str], field_name: &str) -> Result<(), ConfigValidationError> {
        if !options.contains(&value) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "{} 的值 {} 不是有效選項: {:?}",
                field_name, value, options
            )));
        }
        Ok(())
    }

    /// 檢查必要的字串欄位是否有值
    pub fn not_empty(value: &str, field_name: &str) -> Result<(), ConfigValidationError> {
        if value.trim().is_empty() {
            return Err(ConfigValidationError::MissingField(field_name.to_string()));
        }
        Ok(())
    }

    /// 檢查是否為 http(s) 位址
    pub fn http_url(value: &str, field_name: &str) -> Result<(), ConfigValidationError> {
        Self::not_empty(value, field_name)?;
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "{} 必須以 http:// 或 https:// 開頭: {}",
                field_name, value
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range() {
        // 測試有效範圍
        assert!(ValidationUtils::in_range(5, 1, 10, "test_field").is_ok());

        // 測試無效範圍
        let err = ValidationUtils::in_range(15, 1, 10, "test_field").unwrap_err();
        match err {
            ConfigValidationError::RangeError { field, value, min, max } => {
                assert_eq!(field, "test_field");
                assert_eq!(value, "15");
                assert_eq!(min, "1");
                assert_eq!(max, "10");
            }
            _ => panic!("Expected RangeError"),
        }
    }

    #[test]
    fn test_one_of() {
        assert!(ValidationUtils::one_of("json", &["pretty", "json"], "log.format").is_ok());
        assert!(ValidationUtils::one_of("xml", &["pretty", "json"], "log.format").is_err());
    }

    #[test]
    fn test_not_empty() {
        assert!(ValidationUtils::not_empty("test", "test_field").is_ok());
        assert!(ValidationUtils::not_empty("", "test_field").is_err());
        assert!(ValidationUtils::not_empty("   ", "test_field").is_err());
    }

    #[test]
    fn test_http_url() {
        assert!(ValidationUtils::http_url("https://tilde.geonet.org.nz/v4", "upstream.base_url").is_ok());
        assert!(ValidationUtils::http_url("http://127.0.0.1:9000", "upstream.base_url").is_ok());
        assert!(ValidationUtils::http_url("ftp://example.com", "upstream.base_url").is_err());
        assert!(ValidationUtils::http_url("", "upstream.base_url").is_err());
    }
}
