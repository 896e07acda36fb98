use super::dialog::FormDialog;
use super::form::FieldError;
use super::form::FormFields;
use super::notify::NotificationSink;
use crate::model::{SettingsForm, SettingsRecord};
use crate::session::api_client::decode;
use crate::session::{ApiClient, ApiError, HttpMethod, PATH_SETTINGS};
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct SettingsState {
    dialog: FormDialog<SettingsForm>,
    /// 是否成功加载过一次
    loaded: bool,
}

/// 扩展设置（单例记录）的读取与保存
pub struct SettingsController {
    api: Arc<dyn ApiClient>,
    notifier: Arc<dyn NotificationSink>,
    state: Mutex<SettingsState>,
}

impl SettingsController {
    pub fn new(api: Arc<dyn ApiClient>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            api,
            notifier,
            state: Mutex::new(SettingsState::default()),
        }
    }

    /// 拉取设置写入编辑缓冲；服务端区域为空时补上默认区域
    ///
    /// 失败只上报，缓冲保持原样。
    pub async fn load(&self) -> bool {
        let result = self
            .api
            .request(HttpMethod::Get, PATH_SETTINGS, None, None)
            .await
            .and_then(decode::<SettingsRecord>);
        match result {
            Ok(record) => {
                let mut state = self.state.lock();
                state.dialog.data = SettingsForm::from(record);
                state.loaded = true;
                true
            }
            Err(e) => {
                self.notifier.notify_api_error(&e);
                false
            }
        }
    }

    /// 先重新拉取再打开对话框，保证表单反映服务端状态
    pub async fn show_form(&self) -> bool {
        if !self.load().await {
            return false;
        }
        self.state.lock().dialog.show = true;
        true
    }

    /// 保存；成功关闭对话框，失败时对话框和输入都保留
    pub async fn save(&self) -> bool {
        let form = self.state.lock().dialog.data.clone();
        let body = match serde_json::to_value(&form) {
            Ok(v) => v,
            Err(e) => {
                self.notifier
                    .notify_api_error(&ApiError::Decode(e.to_string()));
                return false;
            }
        };
        match self
            .api
            .request(HttpMethod::Put, PATH_SETTINGS, None, Some(body))
            .await
        {
            Ok(_) => {
                info!("settings saved (currency={})", form.currency);
                self.state.lock().dialog.close();
                true
            }
            Err(e) => {
                self.notifier.notify_api_error(&e);
                false
            }
        }
    }

    pub fn close_dialog(&self) {
        self.state.lock().dialog.close();
    }

    /// 已加载的设置缓冲（未加载过时为 None）
    pub fn form(&self) -> Option<SettingsForm> {
        let state = self.state.lock();
        state.loaded.then(|| state.dialog.data.clone())
    }

    pub fn dialog(&self) -> Option<SettingsForm> {
        self.state.lock().dialog.current().cloned()
    }

    pub fn apply_field(&self, key: &str, input: &str) -> Option<Result<(), FieldError>> {
        let mut state = self.state.lock();
        if !state.dialog.show {
            return None;
        }
        Some(state.dialog.data.apply(key, input))
    }

    pub fn currency(&self) -> String {
        self.state.lock().dialog.data.currency.clone()
    }
}
