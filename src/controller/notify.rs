use crate::app_state::AppEvent;
use crate::session::ApiError;
use async_trait::async_trait;
use log::warn;
use tokio::sync::{mpsc, oneshot};

/// 用户可见的错误/提示出口
pub trait NotificationSink: Send + Sync {
    fn notify_api_error(&self, error: &ApiError);
}

/// 破坏性操作前的确认
#[async_trait]
pub trait ConfirmDialog: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// 把通知转成 TUI 日志事件
#[derive(Clone)]
pub struct ChannelNotifier {
    evt_tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChannelNotifier {
    pub fn new(evt_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { evt_tx }
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify_api_error(&self, error: &ApiError) {
        warn!("api error: {}", error);
        let _ = self
            .evt_tx
            .send(AppEvent::Error(format!("✗ {}", error.user_message())));
    }
}

/// 通过 TUI 弹出是/否对话框，等待用户回答
#[derive(Clone)]
pub struct ChannelConfirm {
    evt_tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChannelConfirm {
    pub fn new(evt_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { evt_tx }
    }
}

#[async_trait]
impl ConfirmDialog for ChannelConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        let sent = self.evt_tx.send(AppEvent::Confirm {
            prompt: prompt.to_string(),
            reply,
        });
        if sent.is_err() {
            return false;
        }
        // 界面关闭（reply 被丢弃）视为拒绝
        answer.await.unwrap_or(false)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_confirm_round_trip() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let confirm = ChannelConfirm::new(tx);
        let ui = tokio::spawn(async move {
            match rx.recv().await {
                Some(AppEvent::Confirm { prompt, reply }) => {
                    assert!(prompt.contains("delete"));
                    let _ = reply.send(true);
                }
                _ => panic!("expected confirm event"),
            }
        });
        assert!(confirm.confirm("Are you sure you want to delete this Method?").await);
        ui.await.unwrap();
    }

    #[tokio::test]
    async fn dropped_reply_counts_as_no() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let confirm = ChannelConfirm::new(tx);
        let ui = tokio::spawn(async move {
            let evt = rx.recv().await;
            drop(evt);
        });
        assert!(!confirm.confirm("delete?").await);
        ui.await.unwrap();
    }

    #[tokio::test]
    async fn notifier_emits_error_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelNotifier::new(tx);
        sink.notify_api_error(&ApiError::Status {
            status: 404,
            detail: "Method not found.".into(),
        });
        match rx.recv().await {
            Some(AppEvent::Error(msg)) => assert_eq!(msg, "✗ Method not found."),
            _ => panic!("expected error event"),
        }
    }
}
