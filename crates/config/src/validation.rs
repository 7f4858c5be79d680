// 配置验证

use crate::ConfigResult;

/// 配置段自检
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}
