/// 配置管理模組
///
/// 本模組負責加載、驗證和管理系統配置。
/// 支持開發與生產兩種環境的配置文件，並可由環境變數覆蓋。
// 宣告子模組
pub mod loader;
pub mod manager;
pub mod types;
pub mod validation;

// 重新導出常用組件
pub use loader::{ConfigExt, ConfigLoader, Environment, ENV_PREFIX, LEGACY_ENV_OVERRIDES};
pub use manager::{get_config, init_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError, ValidationUtils, Validator};
