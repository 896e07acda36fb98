use crate::controller::form::{parse_list, FieldError, FieldSpec, FormFields};
use serde::{Deserialize, Serialize};

/// 服务端未配置区域时使用的默认区域列表（顺序固定）
pub const DEFAULT_AVAILABLE_REGIONS: [&str; 11] = [
    "Africa",
    "Asia",
    "Europe",
    "UK/Ireland",
    "North America",
    "South America",
    "Central America",
    "Caribbean",
    "Oceania",
    "Middle East",
    "Antarctica",
];

pub fn default_regions() -> Vec<String> {
    DEFAULT_AVAILABLE_REGIONS.iter().map(|s| s.to_string()).collect()
}

fn default_currency() -> String {
    "sat".to_string()
}

/// 服务端的扩展设置（每个账户一份）
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SettingsRecord {
    #[serde(default)]
    pub available_regions: Option<Vec<String>>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// 设置表单的编辑缓冲
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SettingsForm {
    pub available_regions: Vec<String>,
    pub currency: String,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            available_regions: Vec::new(),
            currency: default_currency(),
        }
    }
}

impl From<SettingsRecord> for SettingsForm {
    fn from(record: SettingsRecord) -> Self {
        let available_regions = match record.available_regions {
            Some(list) if !list.is_empty() => list,
            _ => default_regions(),
        };
        Self {
            available_regions,
            currency: record.currency,
        }
    }
}

const SETTINGS_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("currency", "Currency"),
    FieldSpec::new("available_regions", "Available regions"),
];

impl FormFields for SettingsForm {
    fn fields(&self) -> &'static [FieldSpec] {
        SETTINGS_FIELDS
    }

    fn display(&self, key: &str) -> String {
        match key {
            "currency" => self.currency.clone(),
            "available_regions" => self.available_regions.join(", "),
            _ => String::new(),
        }
    }

    fn apply(&mut self, key: &str, input: &str) -> Result<(), FieldError> {
        match key {
            "currency" => {
                let v = input.trim();
                if v.is_empty() {
                    return Err(FieldError::Required("currency"));
                }
                self.currency = v.to_string();
            }
            "available_regions" => self.available_regions = parse_list(input),
            other => return Err(FieldError::Unknown(other.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: serde_json::Value) -> SettingsRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn empty_or_missing_regions_fall_back_to_defaults() {
        let form = SettingsForm::from(record(json!({"available_regions": [], "currency": "EUR"})));
        assert_eq!(form.available_regions, default_regions());
        assert_eq!(form.available_regions.len(), 11);
        assert_eq!(form.available_regions[3], "UK/Ireland");
        assert_eq!(form.currency, "EUR");

        let form = SettingsForm::from(record(json!({})));
        assert_eq!(form.available_regions, default_regions());
        assert_eq!(form.currency, "sat");
    }

    #[test]
    fn configured_regions_are_kept_as_is() {
        let form = SettingsForm::from(record(json!({"available_regions": ["X"]})));
        assert_eq!(form.available_regions, vec!["X".to_string()]);
    }

    #[test]
    fn unknown_server_fields_are_not_forwarded() {
        let form = SettingsForm::from(record(json!({
            "available_regions": ["X"],
            "currency": "USD",
            "id": "user-1",
            "updated_at": "2024-05-01T10:00:00+00:00"
        })));
        let v = serde_json::to_value(&form).unwrap();
        assert_eq!(v, json!({"available_regions": ["X"], "currency": "USD"}));
    }

    #[test]
    fn form_fields_edit() {
        let mut form = SettingsForm::default();
        form.apply("available_regions", "Asia, Europe ,,").unwrap();
        assert_eq!(form.available_regions, vec!["Asia", "Europe"]);
        assert!(form.apply("currency", "  ").is_err());
        form.apply("currency", "EUR").unwrap();
        assert_eq!(form.display("currency"), "EUR");
    }
}
