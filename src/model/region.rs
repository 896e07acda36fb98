use super::{CellValue, TableRow};
use crate::controller::form::{
    display_opt, parse_list, parse_opt_f64, parse_opt_i64, FieldError, FieldSpec, FormFields,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 运费区域规则（服务端记录）
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct RegionEntry {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub regions: Vec<String>,
    pub price: f64,
    #[serde(default)]
    pub weight_threshold: Option<i64>,
    #[serde(default)]
    pub price_per_g: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl TableRow for RegionEntry {
    fn row_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn cell(&self, field: &str) -> CellValue {
        match field {
            "id" => CellValue::text(&self.id),
            "name" => CellValue::text(&self.name),
            "regions" => CellValue::List(self.regions.clone()),
            "price" => CellValue::Number(self.price),
            "weight_threshold" => CellValue::opt_number(self.weight_threshold.map(|w| w as f64)),
            "price_per_g" => CellValue::opt_number(self.price_per_g),
            "updated_at" => CellValue::opt_text(self.updated_at.as_deref()),
            "created_at" => CellValue::opt_text(self.created_at.as_deref()),
            _ => CellValue::Empty,
        }
    }
}

/// 区域规则的编辑缓冲，`id` 为空表示新建
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct RegionForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub regions: Vec<String>,
    pub price: Option<f64>,
    pub weight_threshold: Option<i64>,
    pub price_per_g: Option<f64>,
    pub extra: Map<String, Value>,
}

impl From<&RegionEntry> for RegionForm {
    fn from(row: &RegionEntry) -> Self {
        Self {
            id: Some(row.id.clone()),
            name: row.name.clone(),
            regions: row.regions.clone(),
            price: Some(row.price),
            weight_threshold: row.weight_threshold,
            price_per_g: row.price_per_g,
            extra: Map::new(),
        }
    }
}

const REGION_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Name"),
    FieldSpec::new("regions", "Regions"),
    FieldSpec::new("price", "Price"),
    FieldSpec::new("weight_threshold", "Weight threshold in grams"),
    FieldSpec::new("price_per_g", "Price per gram"),
];

impl FormFields for RegionForm {
    fn fields(&self) -> &'static [FieldSpec] {
        REGION_FIELDS
    }

    fn display(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            "regions" => self.regions.join(", "),
            "price" => display_opt(&self.price),
            "weight_threshold" => display_opt(&self.weight_threshold),
            "price_per_g" => display_opt(&self.price_per_g),
            _ => String::new(),
        }
    }

    fn apply(&mut self, key: &str, input: &str) -> Result<(), FieldError> {
        match key {
            "name" => self.name = input.trim().to_string(),
            "regions" => self.regions = parse_list(input),
            "price" => self.price = parse_opt_f64("price", input)?,
            "weight_threshold" => {
                self.weight_threshold = parse_opt_i64("weight_threshold", input)?
            }
            "price_per_g" => self.price_per_g = parse_opt_f64("price_per_g", input)?,
            other => return Err(FieldError::Unknown(other.to_string())),
        }
        Ok(())
    }
}
