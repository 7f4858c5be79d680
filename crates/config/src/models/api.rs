use serde::{Deserialize, Serialize};

use crate::validation::ConfigValidator;

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

/// 后端REST接口配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// 资源根地址，例如 `http://localhost:8080/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 请求超时（秒）；不设置则请求不会超时
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: None,
        }
    }
}

impl ApiConfig {
    /// 去掉末尾斜杠后的根地址
    pub fn url_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl ConfigValidator for ApiConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(crate::ConfigError::Validation(
                "API base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(crate::ConfigError::Validation(format!(
                "API base_url must start with http:// or https://: {}",
                self.base_url
            )));
        }

        if self.request_timeout_seconds == Some(0) {
            return Err(crate::ConfigError::Validation(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_root_trims_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://jobs.local/api/".to_string(),
            request_timeout_seconds: None,
        };
        assert_eq!(config.url_root(), "http://jobs.local/api");
    }

    #[test]
    fn test_api_config_validation() {
        assert!(ApiConfig::default().validate().is_ok());

        let bad_scheme = ApiConfig {
            base_url: "ftp://jobs".to_string(),
            ..ApiConfig::default()
        };
        assert!(bad_scheme.validate().is_err());

        let zero_timeout = ApiConfig {
            request_timeout_seconds: Some(0),
            ..ApiConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }
}
