//! Reporter notifications after a status change.
//!
//! Delivery is best-effort: the lifecycle engine hands a `NotificationIntent`
//! to a `Notifier` after the new status is persisted and only logs failures.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::models::enums::ReportStatus;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Notification channel closed")]
    ChannelClosed,

    #[error("Report {0} has no reporter contact")]
    NoContact(String),
}

/// "Notify the reporter of report X that it is now in status Y."
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationIntent {
    pub report_id: String,
    pub new_status: ReportStatus,
    pub recipient_contact: String,
}

impl NotificationIntent {
    /// Message text sent to the reporter.
    pub fn message(&self) -> String {
        format!(
            "Update laporan {}: status sekarang {}.",
            self.report_id,
            self.new_status.label()
        )
    }
}

/// Outbound notification collaborator. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, intent: &NotificationIntent) -> Result<(), NotificationError>;
}

fn require_contact(intent: &NotificationIntent) -> Result<(), NotificationError> {
    if intent.recipient_contact.trim().is_empty() {
        return Err(NotificationError::NoContact(intent.report_id.clone()));
    }
    Ok(())
}

/// Writes the intent to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, intent: &NotificationIntent) -> Result<(), NotificationError> {
        require_contact(intent)?;
        tracing::info!(
            report_id = %intent.report_id,
            status = %intent.new_status,
            recipient = %intent.recipient_contact,
            message = %intent.message(),
            "Reporter notification queued"
        );
        Ok(())
    }
}

/// Hands intents to an async consumer (e.g. a messaging gateway worker).
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<NotificationIntent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NotificationIntent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, intent: &NotificationIntent) -> Result<(), NotificationError> {
        require_contact(intent)?;
        self.tx
            .send(intent.clone())
            .map_err(|_| NotificationError::ChannelClosed)
    }
}
