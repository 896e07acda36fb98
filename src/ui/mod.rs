use crate::app_state::{App, FocusArea, FormView, InputMode, TableView, ViewMode};
use crate::controller::table::Align;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, TableState, Wrap,
    },
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 顶部标题栏
            Constraint::Min(0),    // 中间内容区域
            Constraint::Min(8),    // 底部命令/日志区域
        ])
        .split(f.size());

    render_top_bar(f, chunks[0], app);

    let middle_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(0)])
        .split(chunks[1]);

    render_left_menu(f, middle_chunks[0], app);
    render_main_view(f, middle_chunks[1], app);
    render_bottom_bar(f, chunks[2], app);

    // 弹层：对话框在下，确认框在上
    let screen = f.size();
    if let Some(form) = app.active_form() {
        render_form_dialog(f, screen, &form, app);
    }
    if let Some(pending) = &app.pending_confirm {
        render_confirm(f, screen, &pending.prompt);
    }
}

fn focus_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let title = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan));

    let title_text = Line::from(vec![
        Span::styled(
            " 运费管理 ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " - 计价单位 {} | 可选币种 {}",
            app.page.settings.currency(),
            app.page.currency_options().join("/")
        )),
    ]);

    let paragraph = Paragraph::new(title_text)
        .block(title)
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_left_menu(f: &mut Frame, area: Rect, app: &App) {
    let menu_items: Vec<ListItem> = ViewMode::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let is_selected = i == app.menu_selected_index;
            let is_active = *view == app.view_mode;

            let style = if is_selected {
                if app.focus_area == FocusArea::Menu {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                }
            } else if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };

            let prefix = if is_active { "● " } else { "○ " };
            ListItem::new(format!("{}{}", prefix, view.title())).style(style)
        })
        .collect();

    let title = if app.focus_area == FocusArea::Menu {
        "菜单 (Enter 确认)"
    } else {
        "菜单 (← 切换)"
    };

    let menu = List::new(menu_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(focus_style(app.focus_area == FocusArea::Menu)),
    );

    f.render_widget(menu, area);
}

fn render_main_view(f: &mut Frame, area: Rect, app: &mut App) {
    match app.view_mode {
        ViewMode::Regions | ViewMode::Methods => {
            if let Some(view) = app.table_view() {
                app.clamp_selection(view.rows.len());
                render_table(f, area, app, &view);
            }
        }
        ViewMode::Settings => render_settings(f, area, app),
        ViewMode::Quote => render_quote(f, area, app),
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &App, view: &TableView) {
    let focused = app.focus_area == FocusArea::MainView;
    let sort_field = view.pagination.sort_by.as_deref();

    let header = Row::new(view.columns.iter().map(|c| {
        let arrow = if sort_field == Some(c.field) {
            if view.pagination.descending {
                " ↓"
            } else {
                " ↑"
            }
        } else {
            ""
        };
        Cell::from(format!("{}{}", c.label, arrow))
    }))
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows = view.rows.iter().map(|cells| {
        Row::new(cells.iter().zip(&view.columns).map(|(text, col)| {
            let cell = Cell::from(text.as_str());
            match col.align {
                Align::Right => cell.style(Style::default().fg(Color::Green)),
                Align::Left => cell,
            }
        }))
    });

    let widths = view.columns.iter().map(|c| match c.field {
        "id" => Constraint::Length(24),
        "updated_at" => Constraint::Length(12),
        _ => Constraint::Min(8),
    });

    let p = &view.pagination;
    let first = u64::from(p.page.saturating_sub(1)) * u64::from(p.rows_per_page);
    let shown_to = first + view.rows.len() as u64;
    let mut title = format!(
        "{} [{}-{} / {}] 第 {}/{} 页, 每页 {}",
        app.view_mode.title(),
        if view.rows.is_empty() { 0 } else { first + 1 },
        shown_to,
        p.rows_number,
        p.page,
        p.page_count(),
        p.rows_per_page
    );
    if !view.search.is_empty() {
        title.push_str(&format!(" 搜索: \"{}\"", view.search));
    }
    if view.loading {
        title.push_str(" ⟳ 加载中...");
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(focus_style(focused)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut state = TableState::default();
    if !view.rows.is_empty() {
        state.select(Some(app.selected_index));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn render_settings(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(vec![Span::styled(
            "--- 扩展设置 ---",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
    ];
    match app.page.settings.form() {
        Some(form) => {
            lines.push(Line::from(format!("  计价单位: {}", form.currency)));
            lines.push(Line::from(format!(
                "  可用区域 ({}):",
                form.available_regions.len()
            )));
            for region in &form.available_regions {
                lines.push(Line::from(format!("    • {}", region)));
            }
        }
        None => lines.push(Line::from("尚未加载设置，按 Enter 重新拉取")),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![Span::styled(
        "提示: Enter/e 打开设置对话框（会先从服务端重新拉取）",
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    )]));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("设置")
            .style(focus_style(app.focus_area == FocusArea::MainView)),
    );
    f.render_widget(paragraph, area);
}

fn render_quote(f: &mut Frame, area: Rect, app: &App) {
    let heading = |text: &str| {
        Line::from(vec![Span::styled(
            text.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )])
    };
    let mut lines = vec![heading("--- 最近一次试算 ---")];
    match app.page.last_quote() {
        Some(q) => {
            lines.push(Line::from(format!(
                "  区域: {} ({})  规则: {}",
                q.region, q.regions_name, q.regions_id
            )));
            lines.push(Line::from(format!(
                "  重量: {} g  方式: {}",
                q.weight,
                q.method_title.as_deref().unwrap_or("-")
            )));
            lines.push(Line::from(format!(
                "  基础价格: {}  方式加价: {} ({}%)",
                q.base_price, q.method_fee, q.cost_percentage
            )));
            lines.push(Line::from(vec![Span::styled(
                format!("  合计: {} {}", q.final_price, q.currency),
                Style::default().fg(Color::Green),
            )]));
        }
        None => lines.push(Line::from("  暂无，输入 `/quote <region> <weight> [method]` 试算")),
    }
    lines.push(Line::from(""));
    lines.push(heading("--- 可用区域与方式 ---"));
    match app.page.available_regions() {
        Some(avail) => {
            lines.push(Line::from(format!(
                "  区域: {}",
                avail.available_regions.join(", ")
            )));
            for m in &avail.methods {
                lines.push(Line::from(format!(
                    "  • {} ({}%): {}",
                    m.title,
                    m.cost_percentage,
                    m.regions.join(", ")
                )));
            }
        }
        None => lines.push(Line::from("  尚未加载，按 r 拉取")),
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("运费试算 (r 刷新)")
                .style(focus_style(app.focus_area == FocusArea::MainView)),
        );
    f.render_widget(paragraph, area);
}

/// 居中的弹层区域
fn centered(area: Rect, width_pct: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_pct.min(100)) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_form_dialog(f: &mut Frame, area: Rect, form: &FormView, app: &App) {
    let rect = centered(area, 60, form.fields.len() as u16 * 2 + 4);
    let mut lines = Vec::new();
    for (i, (field, value)) in form.fields.iter().zip(&form.values).enumerate() {
        let selected = i == app.form.field_index;
        let label_style = if selected {
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(
            format!("{} {}", if selected { ">" } else { " " }, field.label),
            label_style,
        )));
        if selected && app.form.editing {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::raw(app.form.input.as_str()),
                Span::styled("_", Style::default().fg(Color::Yellow)),
            ]));
        } else {
            lines.push(Line::from(format!("    {}", value)));
        }
    }
    lines.push(Line::from(Span::styled(
        "↑↓ 选择 Enter 编辑 s 保存 Esc 关闭",
        Style::default().fg(Color::DarkGray),
    )));

    let dialog = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(form.title.as_str())
            .style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(dialog, rect);
}

fn render_confirm(f: &mut Frame, area: Rect, prompt: &str) {
    let rect = centered(area, 50, 5);
    let lines = vec![
        Line::from(prompt),
        Line::from(""),
        Line::from(Span::styled(
            "y 确认 / n 取消",
            Style::default().fg(Color::Yellow),
        )),
    ];
    let dialog = Paragraph::new(lines)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("确认")
                .style(Style::default().fg(Color::Red)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(dialog, rect);
}

fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let bottom_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let (prompt, title, active) = match app.input_mode {
        InputMode::Command => {
            let mut spans = vec![Span::styled(
                "命令: ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )];
            let cur = app.command_cursor.min(app.command_input.len());
            let (left, right) = app.command_input.split_at(cur);
            spans.push(Span::raw(left));
            spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(right));

            // 补全建议显示为灰色幽灵文本
            if let Some(hint) = app.get_completion_hint() {
                spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
            }
            (Line::from(spans), "命令输入模式 (Enter执行 Esc取消 Tab补全 ↑↓历史)", true)
        }
        InputMode::Search => (
            Line::from(vec![
                Span::styled(
                    "搜索: ",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(app.search_input.as_str()),
                Span::styled("_", Style::default().fg(Color::Yellow)),
            ]),
            "搜索 (输入即刷新, Enter/Esc 结束)",
            true,
        ),
        InputMode::Normal => (
            Line::from(vec![
                Span::styled("命令: ", Style::default().fg(Color::Yellow)),
                Span::raw(
                    "/命令 n新建 e编辑 d删除 x导出 f搜索 r刷新 PgUp/PgDn翻页 s排序列 o方向 q退出",
                ),
            ]),
            "命令输入",
            false,
        ),
    };
    let command_paragraph = Paragraph::new(prompt).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(if active {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            }),
    );
    f.render_widget(command_paragraph, bottom_chunks[0]);

    // 日志区域，最新的在顶部，最多 20 条
    let log_items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with('✓') {
                Style::default().fg(Color::Green)
            } else if msg.starts_with('✗') {
                Style::default().fg(Color::Red)
            } else if msg.starts_with('⚠') {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();

    let log = List::new(log_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("日志 (共 {} 条)", app.log_messages.len()))
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(log, bottom_chunks[1]);
}
