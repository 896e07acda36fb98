use serde::{Deserialize, Serialize};

/// 分页接口的统一返回结构 `{data, total}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
}
