use super::{CellValue, TableRow};
use crate::controller::form::{parse_list, FieldError, FieldSpec, FormFields};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 配送方式（服务端记录）
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct MethodEntry {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub cost_percentage: f64,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl TableRow for MethodEntry {
    fn row_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn cell(&self, field: &str) -> CellValue {
        match field {
            "id" => CellValue::text(&self.id),
            "title" => CellValue::text(&self.title),
            "cost_percentage" => CellValue::Number(self.cost_percentage),
            "regions" => CellValue::List(self.regions.clone()),
            "updated_at" => CellValue::opt_text(self.updated_at.as_deref()),
            "created_at" => CellValue::opt_text(self.created_at.as_deref()),
            _ => CellValue::Empty,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct MethodForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub cost_percentage: f64,
    pub regions: Vec<String>,
    pub extra: Map<String, Value>,
}

impl From<&MethodEntry> for MethodForm {
    fn from(row: &MethodEntry) -> Self {
        Self {
            id: Some(row.id.clone()),
            title: row.title.clone(),
            cost_percentage: row.cost_percentage,
            regions: row.regions.clone(),
            extra: Map::new(),
        }
    }
}

const METHOD_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", "Title"),
    FieldSpec::new("cost_percentage", "Cost %"),
    FieldSpec::new("regions", "Regions"),
];

impl FormFields for MethodForm {
    fn fields(&self) -> &'static [FieldSpec] {
        METHOD_FIELDS
    }

    fn display(&self, key: &str) -> String {
        match key {
            "title" => self.title.clone(),
            "cost_percentage" => self.cost_percentage.to_string(),
            "regions" => self.regions.join(", "),
            _ => String::new(),
        }
    }

    fn apply(&mut self, key: &str, input: &str) -> Result<(), FieldError> {
        match key {
            "title" => self.title = input.trim().to_string(),
            "cost_percentage" => {
                let t = input.trim();
                let v = if t.is_empty() {
                    0.0
                } else {
                    t.parse::<f64>().map_err(|_| FieldError::InvalidNumber {
                        field: "cost_percentage",
                        input: t.to_string(),
                    })?
                };
                if !(0.0..=100.0).contains(&v) {
                    return Err(FieldError::OutOfRange {
                        field: "cost_percentage",
                        min: 0.0,
                        max: 100.0,
                    });
                }
                self.cost_percentage = v;
            }
            "regions" => self.regions = parse_list(input),
            other => return Err(FieldError::Unknown(other.to_string())),
        }
        Ok(())
    }
}
