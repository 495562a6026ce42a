//! Delivery channels for due notifications.

use async_trait::async_trait;
use tracing::info;

use seatdesk_core::result::AppResult;
use seatdesk_entity::notification::Notification;

/// Sends one notification to its recipient (email, push, in-app).
///
/// An error or a timeout leaves the notification unsent; the scheduler
/// retries it on the next tick.
#[async_trait]
pub trait NotificationDelivery: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver the notification.
    async fn deliver(&self, notification: &Notification) -> AppResult<()>;
}

/// Delivery that only writes a log line. In-app notifications are read
/// from the store, so logging is all that dispatch has to do for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDelivery;

#[async_trait]
impl NotificationDelivery for LogDelivery {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        info!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            kind = %notification.kind,
            priority = %notification.priority,
            title = %notification.title,
            "Notification delivered"
        );
        Ok(())
    }
}
