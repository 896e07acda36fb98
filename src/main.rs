mod app_service;
mod app_state;
mod commands;
mod config;
mod controller;
mod model;
mod page;
mod session;
mod ui;

use anyhow::Context;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};
use session::HttpSession;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::app_state::{App, AppEvent};
use crate::commands::AppCommand;
use crate::config::AppConfig;
use crate::controller::{ChannelConfirm, ChannelNotifier, ConfirmDialog};
use crate::page::ShippingAdminPage;
use crate::ui::draw;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let log_dir = std::path::PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join(format!("app-{}.log", ts));
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("无法创建日志文件 {}", log_path.display()))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file))) // 输出重定向到文件，避免干扰 TUI
        .filter_level(log::LevelFilter::Warn)
        .filter_module("shipadm", log::LevelFilter::Info)
        .init();

    let mut startup_info = Vec::new();

    let current_dir = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    startup_info.push(format!("当前工作目录: {}", current_dir.display()));

    let env_path = current_dir.join(".env");
    match dotenv::from_path(&env_path) {
        Ok(()) => startup_info.push(format!("✓ 已加载 .env 文件: {}", env_path.display())),
        Err(_) => startup_info.push(format!(
            "⚠ 未找到 .env 文件，从系统环境变量读取: {}",
            env_path.display()
        )),
    }

    let config = AppConfig::from_env().context("配置错误")?;
    if config.api_key.is_some() {
        startup_info.push("✓ 已读取 SHIPPING_API_KEY".to_string());
    } else {
        startup_info.push("⚠ 未设置 SHIPPING_API_KEY，请求将不带认证头".to_string());
    }
    startup_info.push(format!("导出目录: {}", config.export_dir.display()));

    let session = HttpSession::new(&config.base_url, config.api_key.clone(), config.timeout)
        .context("无法创建 HTTP 客户端")?;
    info!("using {}", session);
    startup_info.push(format!("后端地址: {}", session.base_url()));

    // 核心 Channel
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<AppCommand>();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<AppEvent>();

    let page = Arc::new(ShippingAdminPage::new(
        Arc::new(session),
        Arc::new(ChannelNotifier::new(evt_tx.clone())),
        config.export_dir.clone(),
    ));
    let confirm: Arc<dyn ConfirmDialog> = Arc::new(ChannelConfirm::new(evt_tx.clone()));

    // 后台 Actor：每条命令一个任务，互不阻塞（删除确认期间仍可刷新列表）
    {
        let page = page.clone();
        let evt_tx = evt_tx.clone();
        tokio::spawn(async move {
            while let Some(cmd) = cmd_rx.recv().await {
                info!("command: {:?}", cmd);
                tokio::spawn(app_service::dispatch(
                    cmd,
                    page.clone(),
                    confirm.clone(),
                    evt_tx.clone(),
                ));
            }
        });
    }
    let _ = cmd_tx.send(AppCommand::Load);

    // TUI 初始化
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(startup_info, page, cmd_tx);
    let res = run_app_loop(&mut terminal, &mut app, &mut evt_rx).await;

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

async fn run_app_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    evt_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        while let Ok(event) = evt_rx.try_recv() {
            app.handle_event(event);
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key_event(key.code) {
                    return Ok(());
                }
            }
        }
    }
}
