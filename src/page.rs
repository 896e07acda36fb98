use crate::controller::notify::NotificationSink;
use crate::controller::{MethodsController, RegionsController, SettingsController};
use crate::model::{AvailableRegionsResponse, CalculatePriceRequest, CalculatePriceResponse};
use crate::session::api_client::decode;
use crate::session::{
    ApiClient, HttpMethod, PATH_CALCULATE_PRICE, PATH_CURRENCIES, PATH_GET_REGIONS,
};
use log::info;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 默认且总是排在第一位的计价单位
pub const BASE_CURRENCY: &str = "sat";

/// 运费管理页：设置 + 区域规则 + 配送方式，以及币种与试算
pub struct ShippingAdminPage {
    api: Arc<dyn ApiClient>,
    notifier: Arc<dyn NotificationSink>,
    export_dir: PathBuf,
    pub settings: SettingsController,
    pub regions: RegionsController,
    pub methods: MethodsController,
    currency_options: Mutex<Vec<String>>,
    last_quote: Mutex<Option<CalculatePriceResponse>>,
    available: Mutex<Option<AvailableRegionsResponse>>,
}

impl ShippingAdminPage {
    pub fn new(
        api: Arc<dyn ApiClient>,
        notifier: Arc<dyn NotificationSink>,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings: SettingsController::new(api.clone(), notifier.clone()),
            regions: RegionsController::new(api.clone(), notifier.clone()),
            methods: MethodsController::new(api.clone(), notifier.clone()),
            api,
            notifier,
            export_dir: export_dir.into(),
            currency_options: Mutex::new(vec![BASE_CURRENCY.to_string()]),
            last_quote: Mutex::new(None),
            available: Mutex::new(None),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// 页面加载：币种与（设置 → 两个列表）并行；两个列表之间互不依赖
    pub async fn on_load(&self) {
        futures::join!(self.fetch_currencies(), async {
            self.settings.load().await;
            futures::join!(self.regions.list(None), self.methods.list(None));
        });
        info!(
            "page loaded: {} regions, {} methods",
            self.regions.rows().len(),
            self.methods.rows().len()
        );
    }

    /// 拉取宿主支持的法币，结果为 `sat` + 服务端列表（不去重）
    pub async fn fetch_currencies(&self) -> Vec<String> {
        let result = self
            .api
            .request(HttpMethod::Get, PATH_CURRENCIES, None, None)
            .await
            .and_then(decode::<Vec<String>>);
        match result {
            Ok(codes) => {
                let mut options = Vec::with_capacity(codes.len() + 1);
                options.push(BASE_CURRENCY.to_string());
                options.extend(codes);
                *self.currency_options.lock() = options.clone();
                options
            }
            Err(e) => {
                self.notifier.notify_api_error(&e);
                self.currency_options()
            }
        }
    }

    pub fn currency_options(&self) -> Vec<String> {
        self.currency_options.lock().clone()
    }

    /// 可用区域、方式与规则的汇总
    pub async fn load_available_regions(&self) -> Option<AvailableRegionsResponse> {
        let result = self
            .api
            .request(HttpMethod::Get, PATH_GET_REGIONS, None, None)
            .await
            .and_then(decode::<AvailableRegionsResponse>);
        match result {
            Ok(resp) => {
                *self.available.lock() = Some(resp.clone());
                Some(resp)
            }
            Err(e) => {
                self.notifier.notify_api_error(&e);
                None
            }
        }
    }

    pub fn available_regions(&self) -> Option<AvailableRegionsResponse> {
        self.available.lock().clone()
    }

    /// 运费试算
    pub async fn calculate_price(
        &self,
        req: CalculatePriceRequest,
    ) -> Option<CalculatePriceResponse> {
        let body = match serde_json::to_value(&req) {
            Ok(v) => v,
            Err(e) => {
                self.notifier
                    .notify_api_error(&crate::session::ApiError::Decode(e.to_string()));
                return None;
            }
        };
        let result = self
            .api
            .request(HttpMethod::Post, PATH_CALCULATE_PRICE, None, Some(body))
            .await
            .and_then(decode::<CalculatePriceResponse>);
        match result {
            Ok(resp) => {
                *self.last_quote.lock() = Some(resp.clone());
                Some(resp)
            }
            Err(e) => {
                self.notifier.notify_api_error(&e);
                None
            }
        }
    }

    pub fn last_quote(&self) -> Option<CalculatePriceResponse> {
        self.last_quote.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::notify::testing::RecordingSink;
    use crate::session::testing::RecordingClient;
    use crate::session::{ApiError, PATH_SETTINGS};
    use serde_json::json;

    fn setup() -> (Arc<RecordingClient>, Arc<RecordingSink>, ShippingAdminPage) {
        let api = Arc::new(RecordingClient::new());
        let sink = Arc::new(RecordingSink::default());
        let page = ShippingAdminPage::new(api.clone(), sink.clone(), "exports");
        (api, sink, page)
    }

    #[tokio::test]
    async fn currencies_are_prefixed_with_sat_without_dedup() {
        let (api, _sink, page) = setup();
        api.on(HttpMethod::Get, PATH_CURRENCIES, Ok(json!(["USD", "sat", "EUR"])));
        let options = page.fetch_currencies().await;
        assert_eq!(options, vec!["sat", "USD", "sat", "EUR"]);
        assert_eq!(page.currency_options(), options);
    }

    #[tokio::test]
    async fn currency_failure_keeps_default_option() {
        let (api, sink, page) = setup();
        api.on(
            HttpMethod::Get,
            PATH_CURRENCIES,
            Err(ApiError::Transport("down".into())),
        );
        assert_eq!(page.fetch_currencies().await, vec!["sat"]);
        assert_eq!(sink.error_count(), 1);
    }

    #[tokio::test]
    async fn on_load_fetches_everything_once() {
        let (api, sink, page) = setup();
        api.on(HttpMethod::Get, PATH_CURRENCIES, Ok(json!(["USD"])));
        api.on(
            HttpMethod::Get,
            PATH_SETTINGS,
            Ok(json!({"available_regions": [], "currency": "sat"})),
        );
        api.on(
            HttpMethod::Get,
            "/shipping/api/v1/regions/paginated",
            Ok(json!({"data": [{"id": "r1", "name": "EU", "regions": ["Europe"], "price": 5.0}], "total": 1})),
        );
        api.on(
            HttpMethod::Get,
            "/shipping/api/v1/methods/paginated",
            Ok(json!({"data": [], "total": 0})),
        );

        page.on_load().await;

        let paths: Vec<String> = api.calls().into_iter().map(|c| c.path).collect();
        assert_eq!(paths.len(), 4);
        let settings_idx = paths.iter().position(|p| p == PATH_SETTINGS).unwrap();
        let regions_idx = paths
            .iter()
            .position(|p| p.starts_with("/shipping/api/v1/regions/paginated"))
            .unwrap();
        let methods_idx = paths
            .iter()
            .position(|p| p.starts_with("/shipping/api/v1/methods/paginated"))
            .unwrap();
        assert!(settings_idx < regions_idx);
        assert!(settings_idx < methods_idx);
        assert_eq!(page.regions.rows().len(), 1);
        assert_eq!(page.settings.form().unwrap().available_regions.len(), 11);
        assert_eq!(page.currency_options(), vec!["sat", "USD"]);
        assert_eq!(sink.error_count(), 0);
    }

    #[tokio::test]
    async fn calculate_price_stores_last_quote() {
        let (api, sink, page) = setup();
        api.on(
            HttpMethod::Post,
            PATH_CALCULATE_PRICE,
            Ok(json!({
                "regions_id": "r1",
                "regions_name": "EU",
                "region": "Europe",
                "regions": ["Europe"],
                "weight": 1500,
                "base_price": 10.0,
                "cost_percentage": 0.0,
                "method_fee": 0.0,
                "final_price": 10.0,
                "currency": "sat",
                "fiat_price": 10.0,
                "method_id": null,
                "method_title": null
            })),
        );
        let req = CalculatePriceRequest {
            region: "Europe".into(),
            weight: 1500,
            method: None,
        };
        let quote = page.calculate_price(req).await.unwrap();
        assert_eq!(quote.final_price, 10.0);
        assert_eq!(page.last_quote(), Some(quote));
        assert_eq!(
            api.calls()[0].body.clone().unwrap(),
            json!({"region": "Europe", "weight": 1500})
        );

        api.on(
            HttpMethod::Post,
            PATH_CALCULATE_PRICE,
            Err(ApiError::Status {
                status: 400,
                detail: "Region is not available.".into(),
            }),
        );
        let bad = CalculatePriceRequest {
            region: "Mars".into(),
            weight: 1,
            method: None,
        };
        assert!(page.calculate_price(bad).await.is_none());
        assert_eq!(sink.error_count(), 1);
        assert!(page.last_quote().is_some());
    }

    #[tokio::test]
    async fn available_regions_round() {
        let (api, _sink, page) = setup();
        api.on(
            HttpMethod::Get,
            PATH_GET_REGIONS,
            Ok(json!({
                "available_regions": ["Europe"],
                "methods": [{"id": "m1", "title": "Std", "cost_percentage": 0.0, "regions": []}],
                "regions": []
            })),
        );
        let resp = page.load_available_regions().await.unwrap();
        assert_eq!(resp.available_regions, vec!["Europe"]);
        assert_eq!(page.available_regions().unwrap().methods.len(), 1);
    }
}
