use super::api_client::{ApiClient, ApiError, HttpMethod};
use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

/// 基于 reqwest 的后端会话
///
/// 负责拼接 base url、附加 `X-Api-Key` 认证头，并把非 2xx 响应统一转换为 [`ApiError`]。
/// 不做自动重试：失败直接交给调用方（控制器）上报。
pub struct HttpSession {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSession {
    /// 创建一个新的 HttpSession
    ///
    /// # 参数
    ///
    /// * `base_url` - 宿主地址（如 `http://127.0.0.1:5000`）
    /// * `api_key` - 默认使用的钱包 key，可被单次请求覆盖
    /// * `timeout` - 单次请求超时
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("shipadm/0.1")
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn builder(&self, method: HttpMethod, url: &str) -> RequestBuilder {
        match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        }
    }

    async fn read_body(resp: Response) -> Result<Value, ApiError> {
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// 从错误响应体中提取 `detail`
///
/// FastAPI 的 detail 可能是字符串，也可能是校验错误数组（取其中的 `msg`）。
pub fn extract_detail(body: &str) -> String {
    let Ok(v) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    match v.get("detail") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}

#[async_trait]
impl ApiClient for HttpSession {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url(path);
        let mut request = self.builder(method, &url);
        if let Some(key) = api_key.or(self.api_key.as_deref()) {
            request = request.header("X-Api-Key", key);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            info!("{} {}(...) [{}]", self, method, status.as_u16());
            return Self::read_body(resp).await;
        }

        let text = resp.text().await.unwrap_or_default();
        let detail = extract_detail(&text);
        warn!("{} {} {} failed [{}]: {}", self, method, path, status.as_u16(), detail);
        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }
}

impl std::fmt::Display for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<HttpSession [{}]>", self.base_url)
    }
}

impl std::fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<HttpSession [{}]>", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session(server: &MockServer, key: Option<&str>) -> HttpSession {
        HttpSession::new(
            server.uri(),
            key.map(|k| k.to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_sends_api_key_and_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shipping/api/v1/settings"))
            .and(header("X-Api-Key", "inkey-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "currency": "EUR",
                "available_regions": ["Europe"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let s = session(&server, Some("inkey-1"));
        let v = s
            .request(HttpMethod::Get, "/shipping/api/v1/settings", None, None)
            .await
            .unwrap();
        assert_eq!(v["currency"], "EUR");
    }

    #[tokio::test]
    async fn test_per_request_key_overrides_default() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/shipping/api/v1/regions/42"))
            .and(header("X-Api-Key", "adminkey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Regions Deleted"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let s = session(&server, Some("inkey-1"));
        let v = s
            .request(
                HttpMethod::Delete,
                "/shipping/api/v1/regions/42",
                Some("adminkey"),
                None,
            )
            .await
            .unwrap();
        assert_eq!(v["success"], true);
    }

    #[tokio::test]
    async fn test_post_body_and_query_string_pass_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/shipping/api/v1/regions"))
            .and(body_json(json!({"name": "EU"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "r1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shipping/api/v1/regions/paginated"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "total": 0})))
            .mount(&server)
            .await;

        let s = session(&server, None);
        let created = s
            .request(
                HttpMethod::Post,
                "/shipping/api/v1/regions",
                None,
                Some(json!({"name": "EU"})),
            )
            .await
            .unwrap();
        assert_eq!(created["id"], "r1");

        let page = s
            .request(
                HttpMethod::Get,
                "/shipping/api/v1/regions/paginated?limit=10",
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(page["total"], 0);
    }

    #[tokio::test]
    async fn test_error_status_carries_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"detail": "Region already assigned."})),
            )
            .mount(&server)
            .await;

        let s = session(&server, None);
        let err = s
            .request(HttpMethod::Post, "/shipping/api/v1/regions", None, Some(json!({})))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 400,
                detail: "Region already assigned.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let s = session(&server, None);
        let v = s
            .request(HttpMethod::Put, "/shipping/api/v1/settings", None, Some(json!({})))
            .await
            .unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn test_extract_detail_variants() {
        assert_eq!(extract_detail(r#"{"detail":"Method not found."}"#), "Method not found.");
        assert_eq!(
            extract_detail(r#"{"detail":[{"msg":"field required"},{"msg":"value is not a valid float"}]}"#),
            "field required; value is not a valid float"
        );
        assert_eq!(extract_detail("Internal Server Error"), "Internal Server Error");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let s = HttpSession::new("http://localhost:5000/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(s.base_url(), "http://localhost:5000");
        assert_eq!(s.url("/api/v1/currencies"), "http://localhost:5000/api/v1/currencies");
    }
}
