use super::dialog::FormDialog;
use super::export::{self, ExportError};
use super::form::{FieldError, FormFields};
use super::notify::{ConfirmDialog, NotificationSink};
use super::table::{prepare_filter_query, Column, LoadingGuard, Pagination, TableState};
use super::format::date_from_now;
use crate::model::{CellValue, TableRow};
use chrono::{DateTime, Utc};
use crate::session::api_client::decode;
use crate::session::{path_entry, path_paginated, ApiClient, ApiError, HttpMethod, Page};
use log::{debug, info};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// 一类可分页、可增删改的后端资源
pub trait Resource: TableRow + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    type Form: FormFields
        + Serialize
        + Clone
        + Debug
        + Default
        + Send
        + Sync
        + for<'a> From<&'a Self>;

    /// 资源名，同时用作导出文件前缀
    const NAME: &'static str;
    const BASE_PATH: &'static str;
    const DELETE_PROMPT: &'static str;

    fn columns() -> Vec<Column>;
    fn form_id(form: &Self::Form) -> Option<&str>;

    fn display_cell(&self, field: &str, now: DateTime<Utc>) -> String {
        display_cell(self, field, now)
    }
}

/// 表格里显示的文本；时间列显示为相对时间
pub fn display_cell<R: TableRow + ?Sized>(row: &R, field: &str, now: DateTime<Utc>) -> String {
    match (field, row.cell(field)) {
        ("updated_at" | "created_at", CellValue::Text(ts)) => date_from_now(&ts, now),
        (_, value) => value.to_display_string(),
    }
}

struct CrudState<R: Resource> {
    table: TableState,
    rows: Vec<R>,
    dialog: FormDialog<R::Form>,
}

/// 给界面渲染用的一份只读快照
#[derive(Debug, Clone)]
pub struct CrudSnapshot<R: Resource> {
    pub columns: Vec<Column>,
    pub rows: Vec<R>,
    pub search: String,
    pub pagination: Pagination,
    pub loading: bool,
    pub dialog: Option<R::Form>,
}

/// 列表 + 编辑对话框控制器
///
/// 所有网络错误都在这里捕获并交给 [`NotificationSink`]，不会继续向上抛。
/// 重叠的 `list` 请求各自完成，但只有最后发出的那个会写入列表。
pub struct CrudController<R: Resource> {
    api: Arc<dyn ApiClient>,
    notifier: Arc<dyn NotificationSink>,
    columns: Vec<Column>,
    state: Mutex<CrudState<R>>,
    loading: AtomicUsize,
    list_seq: AtomicU64,
}

impl<R: Resource> CrudController<R> {
    pub fn new(api: Arc<dyn ApiClient>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            api,
            notifier,
            columns: R::columns(),
            state: Mutex::new(CrudState {
                table: TableState::default(),
                rows: Vec::new(),
                dialog: FormDialog::default(),
            }),
            loading: AtomicUsize::new(0),
            list_seq: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        R::NAME
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    pub fn rows(&self) -> Vec<R> {
        self.state.lock().rows.clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.state.lock().table.pagination.clone()
    }

    pub fn snapshot(&self) -> CrudSnapshot<R> {
        let state = self.state.lock();
        CrudSnapshot {
            columns: self.columns.clone(),
            rows: state.rows.clone(),
            search: state.table.search.clone(),
            pagination: state.table.pagination.clone(),
            loading: self.is_loading(),
            dialog: state.dialog.current().cloned(),
        }
    }

    // ---- 对话框 ----

    /// 以空白模板打开新建对话框
    pub fn open_new(&self) {
        self.state.lock().dialog.open(R::Form::default());
    }

    /// 以选中行的拷贝打开编辑对话框，编辑不会影响表格中的行
    pub fn open_edit(&self, row: &R) {
        self.state.lock().dialog.open(R::Form::from(row));
    }

    /// 按 id 在当前页中查找并打开编辑
    pub fn open_edit_by_id(&self, id: &str) -> bool {
        let row = self
            .state
            .lock()
            .rows
            .iter()
            .find(|r| r.row_id() == Some(id))
            .cloned();
        match row {
            Some(row) => {
                self.open_edit(&row);
                true
            }
            None => false,
        }
    }

    pub fn close_dialog(&self) {
        self.state.lock().dialog.close();
    }

    pub fn dialog(&self) -> Option<R::Form> {
        self.state.lock().dialog.current().cloned()
    }

    /// 修改对话框中的某个字段；对话框未打开时返回 None
    pub fn apply_field(&self, key: &str, input: &str) -> Option<Result<(), FieldError>> {
        let mut state = self.state.lock();
        if !state.dialog.show {
            return None;
        }
        Some(state.dialog.data.apply(key, input))
    }

    /// 保存对话框内容：有 id 走 PUT，否则 POST
    ///
    /// 成功后刷新列表并关闭对话框；失败时对话框保持打开，缓冲不丢失。
    pub async fn save(&self) -> bool {
        let form = self.state.lock().dialog.data.clone();
        let (method, path) = match R::form_id(&form) {
            Some(id) => (HttpMethod::Put, path_entry(R::BASE_PATH, id)),
            None => (HttpMethod::Post, R::BASE_PATH.to_string()),
        };
        let body = match serde_json::to_value(&form) {
            Ok(v) => v,
            Err(e) => {
                self.notifier
                    .notify_api_error(&ApiError::Decode(e.to_string()));
                return false;
            }
        };

        match self.api.request(method, &path, None, Some(body)).await {
            Ok(_) => {
                info!("{} saved via {} {}", R::NAME, method, path);
                self.list(None).await;
                self.state.lock().dialog.close();
                true
            }
            Err(e) => {
                self.notifier.notify_api_error(&e);
                false
            }
        }
    }

    // ---- 列表 ----

    /// 按当前表格状态（可选覆盖分页）拉取一页数据
    pub async fn list(&self, override_pagination: Option<Pagination>) {
        let _loading = LoadingGuard::acquire(&self.loading);
        let seq = self.list_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let query = {
            let mut state = self.state.lock();
            prepare_filter_query(&mut state.table, override_pagination)
        };
        let path = path_paginated(R::BASE_PATH, &query);

        let result = self
            .api
            .request(HttpMethod::Get, &path, None, None)
            .await
            .and_then(decode::<Page<R>>);

        match result {
            Ok(_) if self.list_seq.load(Ordering::SeqCst) != seq => {
                debug!("{} list #{} superseded, response dropped", R::NAME, seq);
            }
            Ok(page) => {
                let mut state = self.state.lock();
                state.table.pagination.rows_number = page.total;
                state.rows = page.data;
            }
            Err(e) => self.notifier.notify_api_error(&e),
        }
    }

    /// 搜索框变化：记录搜索词并立即刷新
    pub async fn set_search(&self, text: &str) {
        {
            let mut state = self.state.lock();
            let unchanged = state.table.search.trim() == text.trim();
            state.table.search = text.to_string();
            if unchanged {
                return;
            }
        }
        self.list(None).await;
    }

    pub async fn goto_page(&self, page: u32) {
        let p = self.pagination().with_page(page);
        self.list(Some(p)).await;
    }

    pub async fn next_page(&self) {
        let p = self.pagination();
        if p.page < p.page_count() {
            self.list(Some(p.with_page(p.page + 1))).await;
        }
    }

    pub async fn prev_page(&self) {
        let p = self.pagination();
        if p.page > 1 {
            self.list(Some(p.with_page(p.page - 1))).await;
        }
    }

    pub async fn sort_by(&self, field: &str, descending: Option<bool>) {
        let p = self.pagination().with_sort(field, descending);
        self.list(Some(p)).await;
    }

    pub async fn set_rows_per_page(&self, rows: u32) {
        let p = self.pagination().with_rows_per_page(rows);
        self.list(Some(p)).await;
    }

    // ---- 删除 / 导出 ----

    /// 用户确认后删除并刷新列表；拒绝时不发任何请求
    pub async fn delete(&self, id: &str, confirm: &dyn ConfirmDialog) -> bool {
        if !confirm.confirm(R::DELETE_PROMPT).await {
            debug!("{} delete {} declined", R::NAME, id);
            return false;
        }
        let path = path_entry(R::BASE_PATH, id);
        match self.api.request(HttpMethod::Delete, &path, None, None).await {
            Ok(_) => {
                info!("{} {} deleted", R::NAME, id);
                self.list(None).await;
                true
            }
            Err(e) => {
                self.notifier.notify_api_error(&e);
                false
            }
        }
    }

    /// 导出当前已加载的这一页（不是服务端全集）
    pub fn export_csv(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let rows = self.rows();
        let today = chrono::Utc::now().date_naive();
        export::export_csv(dir, R::NAME, today, &self.columns, &rows)
    }
}
