pub mod method;
pub mod quote;
pub mod region;
pub mod settings;

pub use method::{MethodEntry, MethodForm};
pub use quote::{AvailableRegionsResponse, CalculatePriceRequest, CalculatePriceResponse};
pub use region::{RegionEntry, RegionForm};
pub use settings::{SettingsForm, SettingsRecord, DEFAULT_AVAILABLE_REGIONS};

/// 表格单元格的值
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl CellValue {
    pub fn text(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }

    pub fn opt_number(v: Option<f64>) -> Self {
        v.map(CellValue::Number).unwrap_or(CellValue::Empty)
    }

    pub fn opt_text(v: Option<&str>) -> Self {
        v.map(CellValue::text).unwrap_or(CellValue::Empty)
    }

    /// 导出时的字符串形式：列表以逗号连接（与浏览器端 `String(array)` 一致）
    pub fn to_export_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::List(items) => items.join(","),
        }
    }

    /// 表格展示用的字符串
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::List(items) => items.join(", "),
            other => other.to_export_string(),
        }
    }
}

/// 整数值不带小数点输出，其余按最短表示
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// 能在列表中展示 / 导出的一行记录
pub trait TableRow {
    fn row_id(&self) -> Option<&str>;
    fn cell(&self, field: &str) -> CellValue;
}
