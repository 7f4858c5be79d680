//! HTTP传输层
//!
//! 控制器只依赖 [`Transport`] trait；生产环境使用基于 reqwest 的 [`HttpTransport`]，
//! 测试使用内存中的替身。传输层只在网络失败时返回错误，非 2xx 状态照常返回。

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use dashboard_config::ApiConfig;
use dashboard_errors::{DashboardError, DashboardResult};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// 相对于接口根地址的请求
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get<P: Into<String>>(path: P) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post<P: Into<String>>(path: P, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put<P: Into<String>>(path: P, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn delete<P: Into<String>>(path: P) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, Some(body))
    }

    pub fn no_content() -> Self {
        Self::new(204, None)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 非 2xx 转换为 [`DashboardError::Http`]
    pub fn into_result(self) -> DashboardResult<Option<Value>> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(DashboardError::http(self.status, self.body))
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> DashboardResult<ApiResponse>;
}

/// 基于 reqwest 的实现
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> DashboardResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http_client = builder
            .build()
            .map_err(|e| DashboardError::config_error(format!("无法创建HTTP客户端: {e}")))?;

        Ok(Self {
            base_url: config.url_root().to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> DashboardResult<ApiResponse> {
        let url = self.url_for(&request.path);
        debug!("{} {} {:?}", request.method, url, request.query);

        let mut builder = match request.method {
            Method::Get => self.http_client.get(&url),
            Method::Post => self.http_client.post(&url),
            Method::Put => self.http_client.put(&url),
            Method::Delete => self.http_client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!("请求 {} {} 失败: {}", request.method, url, e);
            DashboardError::transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| DashboardError::transport(e.to_string()))?;
        let body = if text.trim().is_empty() {
            None
        } else {
            // 错误页可能不是JSON，此时按字符串保留
            Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        };

        if !(200..300).contains(&status) {
            warn!("{} {} 返回 HTTP {}", request.method, url, status);
        }
        Ok(ApiResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_for_joins_root() {
        let transport = HttpTransport::new(&ApiConfig {
            base_url: "http://localhost:8080/api/".to_string(),
            request_timeout_seconds: Some(5),
        })
        .unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8080/api");
        assert_eq!(transport.url_for("queue/3"), "http://localhost:8080/api/queue/3");
        assert_eq!(transport.url_for("/counts"), "http://localhost:8080/api/counts");
    }

    #[test]
    fn test_response_into_result() {
        assert_eq!(
            ApiResponse::ok(json!({"Id": 1})).into_result().unwrap(),
            Some(json!({"Id": 1}))
        );
        let error = ApiResponse::new(403, None).into_result().unwrap_err();
        assert_eq!(error.status_code(), Some(403));
        assert_eq!(error.user_message(), "Forbidden.");
    }

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::get("queue").with_query("q", "foo").with_query("p", "5");
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.query_value("q"), Some("foo"));
        assert_eq!(request.query_value("p"), Some("5"));
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = HttpTransport::new(&ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_seconds: Some(2),
        })
        .unwrap();
        let error = transport.send(ApiRequest::get("counts")).await.unwrap_err();
        assert_eq!(error.status_code(), Some(0));
        assert_eq!(error.user_message(), "Unknown error (0).");
    }
}
