use serde::{Deserialize, Serialize};

use crate::validation::ConfigValidator;

pub const DEFAULT_DATE_PATTERN: &str = "yyyy-MM-dd h:mm tt";

fn default_date_pattern() -> String {
    DEFAULT_DATE_PATTERN.to_string()
}

fn default_render_debounce_ms() -> u64 {
    100
}

fn default_refresh_interval_seconds() -> u64 {
    10
}

/// 表单显示格式
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_date_pattern")]
    pub date_pattern: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_pattern: default_date_pattern(),
        }
    }
}

impl ConfigValidator for DisplayConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        if self.date_pattern.trim().is_empty() {
            return Err(crate::ConfigError::Validation(
                "Date pattern cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// 侧边栏与自动刷新
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavigationConfig {
    #[serde(default = "default_render_debounce_ms")]
    pub render_debounce_ms: u64,
    #[serde(default = "default_refresh_interval_seconds")]
    pub refresh_interval_seconds: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            render_debounce_ms: default_render_debounce_ms(),
            refresh_interval_seconds: default_refresh_interval_seconds(),
        }
    }
}

impl ConfigValidator for NavigationConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        if self.refresh_interval_seconds == 0 {
            return Err(crate::ConfigError::Validation(
                "Refresh interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
