use crate::commands::{AppCommand, TableKind, TableOp};
use crate::controller::{
    Column, CrudSnapshot, FieldError, FieldSpec, FormFields, Pagination, Resource,
};
use crate::model::TableRow;
use crate::page::ShippingAdminPage;
use chrono::Utc;
use crossterm::event::KeyCode;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ViewMode {
    Regions,
    Methods,
    Settings,
    Quote,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [
        ViewMode::Regions,
        ViewMode::Methods,
        ViewMode::Settings,
        ViewMode::Quote,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ViewMode::Regions => "区域规则",
            ViewMode::Methods => "配送方式",
            ViewMode::Settings => "设置",
            ViewMode::Quote => "运费试算",
        }
    }

    fn table(&self) -> Option<TableKind> {
        match self {
            ViewMode::Regions => Some(TableKind::Regions),
            ViewMode::Methods => Some(TableKind::Methods),
            _ => None,
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    Command,
    Search,
}

#[derive(PartialEq, Debug, Clone)]
pub enum FocusArea {
    Menu,     // 焦点在左侧菜单
    MainView, // 焦点在主视图
}

#[derive(Debug)]
pub enum AppEvent {
    Log(String),
    Message(String),
    Error(String),
    /// 后台任务等待用户回答是/否
    Confirm {
        prompt: String,
        reply: oneshot::Sender<bool>,
    },
}

/// 当前对话框属于哪个控制器
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum FormTarget {
    Settings,
    Table(TableKind),
}

/// 打开中的对话框，已经转成可渲染的字段文本
#[derive(Debug, Clone)]
pub struct FormView {
    pub target: FormTarget,
    pub title: String,
    pub fields: &'static [FieldSpec],
    pub values: Vec<String>,
}

impl FormView {
    fn of<F: FormFields>(target: FormTarget, title: String, form: &F) -> Self {
        let fields = form.fields();
        Self {
            target,
            title,
            fields,
            values: fields.iter().map(|f| form.display(f.key)).collect(),
        }
    }
}

/// 对话框内的光标与行内编辑缓冲
#[derive(Debug, Clone, Default)]
pub struct FormCursor {
    pub field_index: usize,
    pub editing: bool,
    pub input: String,
}

pub struct PendingConfirm {
    pub prompt: String,
    reply: oneshot::Sender<bool>,
}

/// 当前列表页，已格式化为文本
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    pub ids: Vec<Option<String>>,
    pub search: String,
    pub pagination: Pagination,
    pub loading: bool,
}

pub struct App {
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub focus_area: FocusArea,
    pub menu_selected_index: usize,
    pub selected_index: usize,
    pub form: FormCursor,
    pub search_input: String,
    pub pending_confirm: Option<PendingConfirm>,
    pub command_input: String,
    pub command_cursor: usize,
    pub command_history: Vec<String>,
    pub command_history_index: Option<usize>,
    pub log_messages: Vec<String>,
    pub page: Arc<ShippingAdminPage>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
}

impl App {
    pub fn new(
        startup_info: Vec<String>,
        page: Arc<ShippingAdminPage>,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
    ) -> App {
        let mut log_messages = vec!["应用已启动".to_string()];
        log_messages.extend(startup_info);

        App {
            view_mode: ViewMode::Regions,
            input_mode: InputMode::Normal,
            focus_area: FocusArea::MainView,
            menu_selected_index: 0,
            selected_index: 0,
            form: FormCursor::default(),
            search_input: String::new(),
            pending_confirm: None,
            command_input: String::new(),
            command_cursor: 0,
            command_history: Vec::new(),
            command_history_index: None,
            log_messages,
            page,
            cmd_tx,
        }
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Log(msg) | AppEvent::Message(msg) | AppEvent::Error(msg) => {
                self.add_log(msg)
            }
            AppEvent::Confirm { prompt, reply } => {
                // 同一时间只保留一个确认框，旧的视为拒绝
                if let Some(old) = self.pending_confirm.take() {
                    let _ = old.reply.send(false);
                }
                self.pending_confirm = Some(PendingConfirm { prompt, reply });
            }
        }
    }

    fn send(&self, cmd: AppCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    fn send_table(&self, table: TableKind, op: TableOp) {
        self.send(AppCommand::Table { table, op });
    }

    /// 当前视图对应的列表快照
    pub fn table_view(&self) -> Option<TableView> {
        match self.view_mode.table()? {
            TableKind::Regions => Some(to_table_view(self.page.regions.snapshot())),
            TableKind::Methods => Some(to_table_view(self.page.methods.snapshot())),
        }
    }

    /// 当前视图下打开的对话框
    pub fn active_form(&self) -> Option<FormView> {
        match self.view_mode {
            ViewMode::Regions => self.page.regions.dialog().map(|f| {
                let title = if f.id.is_some() { "编辑区域规则" } else { "新建区域规则" };
                FormView::of(FormTarget::Table(TableKind::Regions), title.into(), &f)
            }),
            ViewMode::Methods => self.page.methods.dialog().map(|f| {
                let title = if f.id.is_some() { "编辑配送方式" } else { "新建配送方式" };
                FormView::of(FormTarget::Table(TableKind::Methods), title.into(), &f)
            }),
            ViewMode::Settings => self
                .page
                .settings
                .dialog()
                .map(|f| FormView::of(FormTarget::Settings, "设置".into(), &f)),
            ViewMode::Quote => None,
        }
    }

    fn apply_form_field(
        &self,
        target: FormTarget,
        key: &str,
        input: &str,
    ) -> Option<Result<(), FieldError>> {
        match target {
            FormTarget::Settings => self.page.settings.apply_field(key, input),
            FormTarget::Table(TableKind::Regions) => self.page.regions.apply_field(key, input),
            FormTarget::Table(TableKind::Methods) => self.page.methods.apply_field(key, input),
        }
    }

    fn close_form(&self, target: FormTarget) {
        match target {
            FormTarget::Settings => self.page.settings.close_dialog(),
            FormTarget::Table(TableKind::Regions) => self.page.regions.close_dialog(),
            FormTarget::Table(TableKind::Methods) => self.page.methods.close_dialog(),
        }
    }

    fn save_form(&self, target: FormTarget) {
        match target {
            FormTarget::Settings => self.send(AppCommand::SettingsSave),
            FormTarget::Table(table) => self.send_table(table, TableOp::Save),
        }
    }

    fn open_new(&self, table: TableKind) {
        match table {
            TableKind::Regions => self.page.regions.open_new(),
            TableKind::Methods => self.page.methods.open_new(),
        }
    }

    fn selected_id(&self) -> Option<String> {
        let view = self.table_view()?;
        view.ids.get(self.selected_index).cloned().flatten()
    }

    pub fn clamp_selection(&mut self, len: usize) {
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    fn switch_view(&mut self, view: ViewMode) {
        self.view_mode = view;
        self.selected_index = 0;
        self.form = FormCursor::default();
        if let Some(idx) = ViewMode::ALL.iter().position(|v| *v == view) {
            self.menu_selected_index = idx;
        }
        if view == ViewMode::Quote && self.page.available_regions().is_none() {
            self.send(AppCommand::AvailableRegions);
        }
    }

    /// 获取当前的预测建议
    pub fn get_completion_hint(&self) -> Option<String> {
        let commands = [
            "regions",
            "methods",
            "settings",
            "currencies",
            "available",
            "quote",
            "reload",
            "help",
            "quit",
        ];
        let input = self.command_input.trim();
        if input.is_empty() {
            return None;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.len() == 1 && !self.command_input.ends_with(' ') {
            return commands
                .iter()
                .find(|c| c.starts_with(parts[0]) && **c != parts[0])
                .map(|c| c[parts[0].len()..].to_string());
        }
        let subs: &[&str] = match parts[0] {
            "regions" | "methods" => &[
                "list", "new", "edit", "delete", "export", "page", "rows", "sort", "search",
            ],
            "settings" => &["show", "save"],
            _ => return None,
        };
        let cur = if parts.len() >= 2 { parts[1] } else { "" };
        if parts.len() > 2 || cur.is_empty() {
            return None;
        }
        subs.iter()
            .find(|s| s.starts_with(cur) && **s != cur)
            .map(|s| s[cur.len()..].to_string())
    }

    /// 返回 true 表示退出
    pub fn handle_key_event(&mut self, key: KeyCode) -> bool {
        // 确认框优先
        if let Some(pending) = self.pending_confirm.take() {
            match key {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    let _ = pending.reply.send(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    let _ = pending.reply.send(false);
                }
                _ => self.pending_confirm = Some(pending),
            }
            return false;
        }

        match self.input_mode {
            InputMode::Command => return self.handle_command_key(key),
            InputMode::Search => {
                self.handle_search_key(key);
                return false;
            }
            InputMode::Normal => {}
        }

        if let Some(form) = self.active_form() {
            self.handle_form_key(form, key);
            return false;
        }

        self.handle_normal_key(key)
    }

    fn handle_form_key(&mut self, form: FormView, key: KeyCode) {
        let count = form.fields.len();
        if self.form.field_index >= count {
            self.form.field_index = count.saturating_sub(1);
        }

        if self.form.editing {
            match key {
                KeyCode::Enter => {
                    let field = form.fields[self.form.field_index];
                    let input = std::mem::take(&mut self.form.input);
                    self.form.editing = false;
                    match self.apply_form_field(form.target, field.key, &input) {
                        Some(Ok(())) => {}
                        Some(Err(e)) => self.add_log(format!("✗ {}", e)),
                        None => {}
                    }
                }
                KeyCode::Esc => {
                    self.form.editing = false;
                    self.form.input.clear();
                }
                KeyCode::Backspace => {
                    self.form.input.pop();
                }
                KeyCode::Char(c) => self.form.input.push(c),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Up => self.form.field_index = self.form.field_index.saturating_sub(1),
            KeyCode::Down | KeyCode::Tab => {
                if self.form.field_index + 1 < count {
                    self.form.field_index += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                self.form.editing = true;
                self.form.input = form
                    .values
                    .get(self.form.field_index)
                    .cloned()
                    .unwrap_or_default();
            }
            KeyCode::Char('s') => self.save_form(form.target),
            KeyCode::Esc | KeyCode::Char('c') => {
                self.close_form(form.target);
                self.form = FormCursor::default();
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyCode) {
        let Some(table) = self.view_mode.table() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        match key {
            KeyCode::Enter | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                return;
            }
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            KeyCode::Char(c) => self.search_input.push(c),
            _ => return,
        }
        self.selected_index = 0;
        self.send_table(table, TableOp::Search(self.search_input.clone()));
    }

    fn handle_normal_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.command_input.clear();
                self.command_cursor = 0;
                false
            }
            KeyCode::Char('q') => true,
            KeyCode::Left => {
                self.focus_area = FocusArea::Menu;
                false
            }
            KeyCode::Right => {
                self.focus_area = FocusArea::MainView;
                false
            }
            KeyCode::Up => {
                if self.focus_area == FocusArea::Menu {
                    self.menu_selected_index = self.menu_selected_index.saturating_sub(1);
                } else {
                    self.selected_index = self.selected_index.saturating_sub(1);
                }
                false
            }
            KeyCode::Down => {
                if self.focus_area == FocusArea::Menu {
                    if self.menu_selected_index + 1 < ViewMode::ALL.len() {
                        self.menu_selected_index += 1;
                    }
                } else if let Some(view) = self.table_view() {
                    if self.selected_index + 1 < view.rows.len() {
                        self.selected_index += 1;
                    }
                }
                false
            }
            KeyCode::Enter if self.focus_area == FocusArea::Menu => {
                let view = ViewMode::ALL[self.menu_selected_index.min(ViewMode::ALL.len() - 1)];
                self.switch_view(view);
                self.focus_area = FocusArea::MainView;
                false
            }
            _ => {
                match self.view_mode.table() {
                    Some(table) => self.handle_table_key(table, key),
                    None if self.view_mode == ViewMode::Settings => {
                        if matches!(key, KeyCode::Enter | KeyCode::Char('e')) {
                            self.form = FormCursor::default();
                            self.send(AppCommand::SettingsShow);
                        }
                    }
                    None => {
                        if key == KeyCode::Char('r') {
                            self.send(AppCommand::AvailableRegions);
                        }
                    }
                }
                false
            }
        }
    }

    fn handle_table_key(&mut self, table: TableKind, key: KeyCode) {
        match key {
            KeyCode::Char('n') => {
                self.form = FormCursor::default();
                self.open_new(table);
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    self.form = FormCursor::default();
                    self.send_table(table, TableOp::Edit(id));
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    self.send_table(table, TableOp::Delete(id));
                }
            }
            KeyCode::Char('x') => self.send_table(table, TableOp::Export),
            KeyCode::Char('r') => self.send_table(table, TableOp::List),
            KeyCode::Char('f') => {
                self.search_input = self.table_view().map(|v| v.search).unwrap_or_default();
                self.input_mode = InputMode::Search;
            }
            KeyCode::PageDown => {
                self.selected_index = 0;
                self.send_table(table, TableOp::NextPage);
            }
            KeyCode::PageUp => {
                self.selected_index = 0;
                self.send_table(table, TableOp::PrevPage);
            }
            KeyCode::Char('s') => {
                if let Some(view) = self.table_view() {
                    let field = next_sort_field(&view.columns, view.pagination.sort_by.as_deref());
                    if let Some(field) = field {
                        self.send_table(
                            table,
                            TableOp::Sort {
                                field,
                                descending: Some(view.pagination.descending),
                            },
                        );
                    }
                }
            }
            KeyCode::Char('o') => {
                if let Some(view) = self.table_view() {
                    if let Some(field) = view.pagination.sort_by.clone() {
                        self.send_table(
                            table,
                            TableOp::Sort {
                                field,
                                descending: Some(!view.pagination.descending),
                            },
                        );
                    }
                }
            }
            _ => {}
        }
    }

    /// 返回 true 表示退出
    fn handle_command_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Enter => {
                let cmd_owned = self.command_input.trim().to_string();
                self.command_input.clear();
                self.command_cursor = 0;
                self.input_mode = InputMode::Normal;
                if cmd_owned.is_empty() {
                    return false;
                }
                match AppCommand::from_str(&cmd_owned) {
                    Ok(AppCommand::Quit) => return true,
                    Ok(AppCommand::Table { table, op }) => {
                        // 切到对应视图，让结果可见
                        let view = match table {
                            TableKind::Regions => ViewMode::Regions,
                            TableKind::Methods => ViewMode::Methods,
                        };
                        if self.view_mode != view {
                            self.switch_view(view);
                        }
                        if matches!(op, TableOp::New | TableOp::Edit(_)) {
                            self.form = FormCursor::default();
                        }
                        self.send_table(table, op);
                    }
                    Ok(AppCommand::SettingsShow) => {
                        self.switch_view(ViewMode::Settings);
                        self.send(AppCommand::SettingsShow);
                    }
                    Ok(AppCommand::Quote {
                        region,
                        weight,
                        method,
                    }) => {
                        if self.view_mode != ViewMode::Quote {
                            self.switch_view(ViewMode::Quote);
                        }
                        self.send(AppCommand::Quote {
                            region,
                            weight,
                            method,
                        });
                    }
                    Ok(app_cmd) => self.send(app_cmd),
                    Err(_) => self.send(AppCommand::Unknown(cmd_owned.clone())),
                }
                self.command_history.push(cmd_owned);
                self.command_history_index = None;
            }
            KeyCode::Esc => {
                self.command_input.clear();
                self.command_cursor = 0;
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Tab => {
                if let Some(hint) = self.get_completion_hint() {
                    let insert = format!("{} ", hint);
                    self.command_input.insert_str(self.command_cursor, &insert);
                    self.command_cursor += insert.len();
                }
            }
            KeyCode::Up => {
                if self.command_history.is_empty() {
                    return false;
                }
                let next = match self.command_history_index {
                    None => self.command_history.len() - 1,
                    Some(i) => i.saturating_sub(1),
                };
                self.command_history_index = Some(next);
                if let Some(cmd) = self.command_history.get(next) {
                    self.command_input = cmd.clone();
                    self.command_cursor = self.command_input.len();
                }
            }
            KeyCode::Down => {
                let Some(i) = self.command_history_index else {
                    return false;
                };
                let next = i + 1;
                if next >= self.command_history.len() {
                    self.command_history_index = None;
                    self.command_input.clear();
                    self.command_cursor = 0;
                    return false;
                }
                self.command_history_index = Some(next);
                if let Some(cmd) = self.command_history.get(next) {
                    self.command_input = cmd.clone();
                    self.command_cursor = self.command_input.len();
                }
            }
            KeyCode::Backspace => {
                if self.command_cursor > 0 {
                    let idx = prev_char_boundary(&self.command_input, self.command_cursor);
                    self.command_input.remove(idx);
                    self.command_cursor = idx;
                }
            }
            KeyCode::Delete => {
                if self.command_cursor < self.command_input.len() {
                    self.command_input.remove(self.command_cursor);
                }
            }
            KeyCode::Left => {
                if self.command_cursor > 0 {
                    self.command_cursor = prev_char_boundary(&self.command_input, self.command_cursor);
                }
            }
            KeyCode::Right => {
                if let Some(c) = self.command_input[self.command_cursor..].chars().next() {
                    self.command_cursor += c.len_utf8();
                }
            }
            KeyCode::Home => self.command_cursor = 0,
            KeyCode::End => self.command_cursor = self.command_input.len(),
            KeyCode::Char(c) => {
                self.command_input.insert(self.command_cursor, c);
                self.command_cursor += c.len_utf8();
            }
            _ => {}
        }
        false
    }
}

fn prev_char_boundary(s: &str, pos: usize) -> usize {
    s[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// 在可排序列之间循环
fn next_sort_field(columns: &[Column], current: Option<&str>) -> Option<String> {
    let sortable: Vec<&Column> = columns.iter().filter(|c| c.sortable).collect();
    if sortable.is_empty() {
        return None;
    }
    let next = match current.and_then(|f| sortable.iter().position(|c| c.field == f)) {
        Some(i) => (i + 1) % sortable.len(),
        None => 0,
    };
    Some(sortable[next].field.to_string())
}

fn to_table_view<R: Resource>(snap: CrudSnapshot<R>) -> TableView {
    let now = Utc::now();
    let rows = snap
        .rows
        .iter()
        .map(|row| {
            snap.columns
                .iter()
                .map(|c| row.display_cell(c.field, now))
                .collect()
        })
        .collect();
    let ids = snap
        .rows
        .iter()
        .map(|row| row.row_id().map(|s| s.to_string()))
        .collect();
    TableView {
        columns: snap.columns,
        rows,
        ids,
        search: snap.search,
        pagination: snap.pagination,
        loading: snap.loading,
    }
}
