/// 表单中的一个可编辑字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
}

impl FieldSpec {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field}: '{input}' is not a valid number")]
    InvalidNumber { field: &'static str, input: String },
    #[error("{field}: must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("unknown field {0}")]
    Unknown(String),
}

/// 可在对话框里逐字段编辑的缓冲
///
/// TUI 通过这个 trait 渲染并修改任意表单，输入总是字符串，由实现方负责解析。
pub trait FormFields: Send {
    fn fields(&self) -> &'static [FieldSpec];
    fn display(&self, key: &str) -> String;
    fn apply(&mut self, key: &str, input: &str) -> Result<(), FieldError>;
}

/// 逗号分隔的列表，去掉空白项
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// 空输入视为未填写
pub fn parse_opt_f64(field: &'static str, input: &str) -> Result<Option<f64>, FieldError> {
    let t = input.trim();
    if t.is_empty() {
        return Ok(None);
    }
    t.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| FieldError::InvalidNumber {
            field,
            input: t.to_string(),
        })
}

pub fn parse_opt_i64(field: &'static str, input: &str) -> Result<Option<i64>, FieldError> {
    let t = input.trim();
    if t.is_empty() {
        return Ok(None);
    }
    t.parse::<i64>()
        .map(Some)
        .map_err(|_| FieldError::InvalidNumber {
            field,
            input: t.to_string(),
        })
}

pub fn display_opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(|x| x.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(" Asia,Europe , "), vec!["Asia", "Europe"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_opt_f64("price", " 5.5 ").unwrap(), Some(5.5));
        assert_eq!(parse_opt_f64("price", "").unwrap(), None);
        assert!(matches!(
            parse_opt_f64("price", "abc"),
            Err(FieldError::InvalidNumber { field: "price", .. })
        ));
        assert!(parse_opt_f64("price", "NaN").is_err());
        assert_eq!(parse_opt_i64("weight_threshold", "500").unwrap(), Some(500));
        assert!(parse_opt_i64("weight_threshold", "1.5").is_err());
    }
}
