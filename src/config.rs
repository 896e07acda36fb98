use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_EXPORT_DIR: &str = "exports";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid env {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// 运行配置，全部来自环境变量（可由 .env 提供）
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    /// 钱包 admin key，作为默认的 X-Api-Key
    pub api_key: Option<String>,
    pub export_dir: PathBuf,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| get(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = non_empty("SHIPPING_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let export_dir = non_empty("SHIPPING_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR));
        let timeout_secs = match non_empty("SHIPPING_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Invalid {
                    name: "SHIPPING_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            api_key: non_empty("SHIPPING_API_KEY"),
            export_dir,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
