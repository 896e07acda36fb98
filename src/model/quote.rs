use super::{MethodEntry, RegionEntry};
use serde::{Deserialize, Serialize};

/// `get_regions` 接口：可用区域 + 全部方式 + 全部规则
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AvailableRegionsResponse {
    #[serde(default)]
    pub available_regions: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
    #[serde(default)]
    pub regions: Vec<RegionEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalculatePriceRequest {
    pub region: String,
    pub weight: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CalculatePriceResponse {
    pub regions_id: String,
    pub regions_name: String,
    pub region: String,
    #[serde(default)]
    pub regions: Vec<String>,
    pub weight: i64,
    pub base_price: f64,
    pub cost_percentage: f64,
    pub method_fee: f64,
    pub final_price: f64,
    pub currency: String,
    #[serde(default)]
    pub fiat_price: f64,
    #[serde(default)]
    pub method_id: Option<String>,
    #[serde(default)]
    pub method_title: Option<String>,
}

impl CalculatePriceResponse {
    pub fn summary(&self) -> String {
        let method = self.method_title.as_deref().unwrap_or("-");
        format!(
            "{} ({}g) via {} [{}]: base {} + fee {} ({}%) = {} {}",
            self.region,
            self.weight,
            self.regions_name,
            method,
            self.base_price,
            self.method_fee,
            self.cost_percentage,
            self.final_price,
            self.currency
        )
    }
}
