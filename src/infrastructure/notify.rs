use crate::domain::ports::{Notification, NotificationSink};
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Emits notifications as log events. Used by the CLI, where no delivery
/// channel exists.
#[derive(Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, note: Notification) -> io::Result<()> {
        tracing::info!(
            owner = %note.owner,
            order = note.order_id,
            title = %note.title,
            "{}",
            note.message
        );
        Ok(())
    }
}

/// Records every notification for inspection. Test and demo sink.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, note: Notification) -> io::Result<()> {
        self.sent.write().await.push(note);
        Ok(())
    }
}
