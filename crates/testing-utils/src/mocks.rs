//! Mock transport for controller tests
//!
//! Responses are scripted per `(method, path)`. Several replies for the same
//! route are served in order; the last one keeps repeating. Unscripted
//! requests get a 404. Every request is recorded for later assertions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use dashboard_client::{ApiRequest, ApiResponse, Method, Transport};
use dashboard_errors::{DashboardError, DashboardResult};
use serde_json::Value;

#[derive(Debug, Clone)]
enum MockReply {
    Response(ApiResponse),
    TransportError(String),
}

#[derive(Debug)]
struct Route {
    method: Method,
    path: String,
    replies: VecDeque<MockReply>,
}

#[derive(Debug, Default)]
struct MockState {
    routes: Vec<Route>,
    requests: Vec<ApiRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn push(&self, method: Method, path: &str, reply: MockReply) {
        let mut state = self.lock();
        match state
            .routes
            .iter_mut()
            .find(|route| route.method == method && route.path == path)
        {
            Some(route) => route.replies.push_back(reply),
            None => state.routes.push(Route {
                method,
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
    }

    pub fn on(&self, method: Method, path: &str, response: ApiResponse) -> &Self {
        self.push(method, path, MockReply::Response(response));
        self
    }

    pub fn on_get(&self, path: &str, body: Value) -> &Self {
        self.on(Method::Get, path, ApiResponse::ok(body))
    }

    pub fn on_status(&self, method: Method, path: &str, status: u16, body: Option<Value>) -> &Self {
        self.on(method, path, ApiResponse::new(status, body))
    }

    /// Simulate a network failure (no HTTP status)
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, MockReply::TransportError(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .cloned()
            .collect()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.lock().requests.last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> DashboardResult<ApiResponse> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        let reply = state
            .routes
            .iter_mut()
            .find(|route| route.method == request.method && route.path == request.path)
            .and_then(|route| {
                if route.replies.len() > 1 {
                    route.replies.pop_front()
                } else {
                    route.replies.front().cloned()
                }
            });

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::TransportError(message)) => Err(DashboardError::transport(message)),
            None => Ok(ApiResponse::new(404, None)),
        }
    }
}
