//! 测试用的内存 ApiClient：记录每一次请求，并按路由返回预设响应。

use super::api_client::{ApiClient, ApiError, HttpMethod};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub api_key: Option<String>,
    pub body: Option<Value>,
}

struct Route {
    method: HttpMethod,
    prefix: String,
    replies: Vec<(Duration, Result<Value, ApiError>)>,
    served: usize,
}

#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<RecordedCall>>,
    routes: Mutex<Vec<Route>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个响应；同一路由的响应按顺序使用，用完后重复最后一个
    pub fn on(&self, method: HttpMethod, prefix: &str, reply: Result<Value, ApiError>) -> &Self {
        self.on_delayed(method, prefix, Duration::ZERO, reply)
    }

    pub fn on_delayed(
        &self,
        method: HttpMethod,
        prefix: &str,
        delay: Duration,
        reply: Result<Value, ApiError>,
    ) -> &Self {
        let mut routes = self.routes.lock();
        if let Some(route) = routes
            .iter_mut()
            .find(|r| r.method == method && r.prefix == prefix)
        {
            route.replies.push((delay, reply));
        } else {
            routes.push(Route {
                method,
                prefix: prefix.to_string(),
                replies: vec![(delay, reply)],
                served: 0,
            });
        }
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, method: HttpMethod) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    fn next_reply(&self, method: HttpMethod, path: &str) -> (Duration, Result<Value, ApiError>) {
        let mut routes = self.routes.lock();
        let route = routes
            .iter_mut()
            .filter(|r| r.method == method && path.starts_with(&r.prefix))
            .max_by_key(|r| r.prefix.len());
        match route {
            Some(route) => {
                let idx = route.served.min(route.replies.len() - 1);
                route.served += 1;
                route.replies[idx].clone()
            }
            None => (
                Duration::ZERO,
                Err(ApiError::Status {
                    status: 404,
                    detail: format!("no route for {} {}", method, path),
                }),
            ),
        }
    }
}

#[async_trait]
impl ApiClient for RecordingClient {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.calls.lock().push(RecordedCall {
            method,
            path: path.to_string(),
            api_key: api_key.map(|k| k.to_string()),
            body,
        });
        let (delay, reply) = self.next_reply(method, path);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}
