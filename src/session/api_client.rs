use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// 给用户看的简短描述（优先使用服务端 detail）
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { detail, .. } if !detail.is_empty() => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// 后端 REST 客户端抽象
///
/// 所有控制器都只通过这个 trait 访问后端；`api_key` 为空时使用客户端默认凭据。
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> Result<Value, ApiError>;
}

/// 把 JSON 响应解析为具体类型
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
