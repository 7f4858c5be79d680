use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

#[cfg(test)]
mod tests;

/// 字段错误集合：属性名 -> 错误消息
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("HTTP错误: {status}")]
    Http { status: u16, body: Option<Value> },
    #[error("网络错误: {0}")]
    Transport(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("数据验证失败: {} 个字段", .0.len())]
    Validation(FieldErrors),
    #[error("表单正在提交中")]
    SubmissionInFlight,
    #[error("记录未找到: {id}")]
    RecordNotFound { id: i64 },
    #[error("不支持的操作: {0}")]
    Unsupported(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// 将HTTP状态码映射为固定的用户提示
pub fn http_status_message(status: u16) -> String {
    match status {
        400 => "Bad request.".to_string(),
        403 => "Forbidden.".to_string(),
        404 => "Not found.".to_string(),
        500 => "Server error.".to_string(),
        other => format!("Unknown error ({other})."),
    }
}

impl DashboardError {
    pub fn http<B: Into<Option<Value>>>(status: u16, body: B) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn record_not_found(id: i64) -> Self {
        Self::RecordNotFound { id }
    }

    /// HTTP状态码；网络层失败（没有响应）视为 0
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DashboardError::Http { status, .. } => Some(*status),
            DashboardError::Transport(_) => Some(0),
            _ => None,
        }
    }

    /// 是否属于字段级错误（留在表单内，不影响列表状态）
    pub fn is_field_level(&self) -> bool {
        match self {
            DashboardError::Validation(_) => true,
            DashboardError::Http { .. } => self.server_field_errors().is_some(),
            _ => false,
        }
    }

    /// 从 400 响应体中提取服务端字段错误。
    ///
    /// 支持两种形态：`{"Errors": {"Name": "..."}}` 和平铺的 `{"Name": "..."}`。
    /// 数组形式的消息取第一条。
    pub fn server_field_errors(&self) -> Option<FieldErrors> {
        let DashboardError::Http {
            status: 400,
            body: Some(body),
        } = self
        else {
            return None;
        };

        let map = body
            .get("Errors")
            .and_then(Value::as_object)
            .or_else(|| body.as_object())?;

        let mut errors = FieldErrors::new();
        for (key, value) in map {
            let message = match value {
                Value::String(s) => Some(s.clone()),
                Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
                _ => None,
            };
            if let Some(message) = message.filter(|m| !m.is_empty()) {
                errors.insert(key.clone(), message);
            }
        }

        if errors.is_empty() {
            None
        } else {
            Some(errors)
        }
    }

    /// 面向用户的提示信息
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Http { status, .. } => http_status_message(*status),
            DashboardError::Transport(_) => http_status_message(0),
            DashboardError::Validation(_) => "Please correct the highlighted fields.".to_string(),
            DashboardError::SubmissionInFlight => "A submission is already in progress.".to_string(),
            DashboardError::RecordNotFound { .. } => http_status_message(404),
            _ => "An unexpected error occurred.".to_string(),
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        DashboardError::Internal(err.to_string())
    }
}
