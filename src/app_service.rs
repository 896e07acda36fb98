use crate::app_state::AppEvent;
use crate::commands::{AppCommand, TableKind, TableOp, HELP_TEXT};
use crate::controller::{ConfirmDialog, CrudController, Resource};
use crate::model::CalculatePriceRequest;
use crate::page::ShippingAdminPage;
use log::info;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// 执行一条命令；网络错误已由控制器通过 NotificationSink 上报，这里只补充成功提示
pub async fn dispatch(
    cmd: AppCommand,
    page: Arc<ShippingAdminPage>,
    confirm: Arc<dyn ConfirmDialog>,
    tx: mpsc::UnboundedSender<AppEvent>,
) {
    match cmd {
        AppCommand::Load => {
            page.on_load().await;
            let _ = tx.send(AppEvent::Message(format!(
                "✓ 已加载 {} 条区域规则, {} 种配送方式",
                page.regions.pagination().rows_number,
                page.methods.pagination().rows_number
            )));
        }
        AppCommand::Table { table, op } => match table {
            TableKind::Regions => {
                run_table_op(&page.regions, op, page.export_dir(), confirm.as_ref(), &tx).await
            }
            TableKind::Methods => {
                run_table_op(&page.methods, op, page.export_dir(), confirm.as_ref(), &tx).await
            }
        },
        AppCommand::SettingsShow => {
            if page.settings.show_form().await {
                let _ = tx.send(AppEvent::Log("已打开设置".to_string()));
            }
        }
        AppCommand::SettingsSave => {
            if page.settings.save().await {
                let _ = tx.send(AppEvent::Message("✓ 设置已保存".to_string()));
            }
        }
        AppCommand::Currencies => {
            let options = page.fetch_currencies().await;
            let _ = tx.send(AppEvent::Message(format!("币种: {}", options.join(", "))));
        }
        AppCommand::AvailableRegions => {
            if let Some(resp) = page.load_available_regions().await {
                let _ = tx.send(AppEvent::Message(format!(
                    "✓ 可用区域 {} 个, 方式 {} 种, 规则 {} 条",
                    resp.available_regions.len(),
                    resp.methods.len(),
                    resp.regions.len()
                )));
            }
        }
        AppCommand::Quote {
            region,
            weight,
            method,
        } => {
            let req = CalculatePriceRequest {
                region,
                weight,
                method,
            };
            if let Some(quote) = page.calculate_price(req).await {
                let _ = tx.send(AppEvent::Message(format!("✓ {}", quote.summary())));
            }
        }
        AppCommand::Help => {
            let _ = tx.send(AppEvent::Message(HELP_TEXT.to_string()));
        }
        AppCommand::Quit => {
            let _ = tx.send(AppEvent::Message("收到退出命令".to_string()));
        }
        AppCommand::Unknown(msg) => {
            let _ = tx.send(AppEvent::Error(format!("✗ {}", msg)));
        }
    }
}

async fn run_table_op<R: Resource>(
    ctl: &CrudController<R>,
    op: TableOp,
    export_dir: &Path,
    confirm: &dyn ConfirmDialog,
    tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match op {
        TableOp::List => ctl.list(None).await,
        TableOp::Search(text) => ctl.set_search(&text).await,
        TableOp::Page(n) => ctl.goto_page(n).await,
        TableOp::NextPage => ctl.next_page().await,
        TableOp::PrevPage => ctl.prev_page().await,
        TableOp::Rows(n) => ctl.set_rows_per_page(n).await,
        TableOp::Sort { field, descending } => ctl.sort_by(&field, descending).await,
        TableOp::New => ctl.open_new(),
        TableOp::Edit(id) => {
            if !ctl.open_edit_by_id(&id) {
                let _ = tx.send(AppEvent::Error(format!(
                    "✗ 当前页没有 {} {}",
                    ctl.name(),
                    id
                )));
            }
        }
        TableOp::Save => {
            if ctl.dialog().is_none() {
                let _ = tx.send(AppEvent::Error("✗ 没有打开的对话框".to_string()));
            } else if ctl.save().await {
                let _ = tx.send(AppEvent::Message(format!("✓ {} 已保存", ctl.name())));
            }
        }
        TableOp::Delete(id) => {
            if ctl.delete(&id, confirm).await {
                let _ = tx.send(AppEvent::Message(format!("✓ 已删除 {} {}", ctl.name(), id)));
            }
        }
        TableOp::Export => match ctl.export_csv(export_dir) {
            Ok(path) => {
                info!("exported {} to {}", ctl.name(), path.display());
                let _ = tx.send(AppEvent::Message(format!("✓ 已导出: {}", path.display())));
            }
            Err(e) => {
                let _ = tx.send(AppEvent::Error(format!("✗ 导出失败: {}", e)));
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::notify::testing::{FixedConfirm, RecordingSink};
    use crate::session::testing::RecordingClient;
    use crate::session::HttpMethod;
    use serde_json::json;

    fn setup(dir: &Path) -> (Arc<RecordingClient>, Arc<ShippingAdminPage>) {
        let api = Arc::new(RecordingClient::new());
        let sink = Arc::new(RecordingSink::default());
        let page = Arc::new(ShippingAdminPage::new(api.clone(), sink, dir));
        (api, page)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(evt) = rx.try_recv() {
            match evt {
                AppEvent::Log(m) | AppEvent::Message(m) | AppEvent::Error(m) => out.push(m),
                AppEvent::Confirm { prompt, .. } => out.push(prompt),
            }
        }
        out
    }

    #[tokio::test]
    async fn export_reports_written_path() {
        let dir = tempfile::tempdir().unwrap();
        let (api, page) = setup(dir.path());
        api.on(
            HttpMethod::Get,
            "/shipping/api/v1/regions/paginated",
            Ok(json!({"data": [{"id": "r1", "name": "EU", "regions": ["Europe"], "price": 5}], "total": 1})),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let confirm: Arc<dyn ConfirmDialog> = Arc::new(FixedConfirm::new(true));

        let list = AppCommand::Table {
            table: TableKind::Regions,
            op: TableOp::List,
        };
        dispatch(list, page.clone(), confirm.clone(), tx.clone()).await;
        let export = AppCommand::Table {
            table: TableKind::Regions,
            op: TableOp::Export,
        };
        dispatch(export, page.clone(), confirm, tx).await;

        let msgs = drain(&mut rx);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].starts_with("✓ 已导出"));
        let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
    }

    #[tokio::test]
    async fn delete_uses_given_confirm() {
        let dir = tempfile::tempdir().unwrap();
        let (api, page) = setup(dir.path());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let confirm: Arc<dyn ConfirmDialog> = Arc::new(FixedConfirm::new(false));
        let cmd = AppCommand::Table {
            table: TableKind::Methods,
            op: TableOp::Delete("m1".into()),
        };
        dispatch(cmd, page, confirm, tx).await;
        assert!(api.calls().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn save_without_dialog_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (api, page) = setup(dir.path());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let confirm: Arc<dyn ConfirmDialog> = Arc::new(FixedConfirm::new(true));
        let cmd = AppCommand::Table {
            table: TableKind::Regions,
            op: TableOp::Save,
        };
        dispatch(cmd, page, confirm, tx).await;
        assert!(api.calls().is_empty());
        assert_eq!(drain(&mut rx), vec!["✗ 没有打开的对话框".to_string()]);
    }

    #[tokio::test]
    async fn unknown_command_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (_api, page) = setup(dir.path());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let confirm: Arc<dyn ConfirmDialog> = Arc::new(FixedConfirm::new(true));
        dispatch(AppCommand::Unknown("未知命令: x".into()), page, confirm, tx).await;
        assert_eq!(drain(&mut rx), vec!["✗ 未知命令: x".to_string()]);
    }
}
