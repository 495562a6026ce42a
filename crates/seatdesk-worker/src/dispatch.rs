//! One pass over due notifications.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time;
use tracing::{debug, warn};

use seatdesk_core::config::SchedulerConfig;
use seatdesk_core::error::AppError;
use seatdesk_core::result::AppResult;
use seatdesk_service::NotificationService;

use crate::delivery::NotificationDelivery;

/// Counts from one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Notifications handed to the delivery channel.
    pub attempted: usize,
    /// Delivered and marked sent.
    pub sent: usize,
    /// Failed, timed out, or could not be marked; retried next pass.
    pub failed: usize,
}

/// Hands due notifications to the delivery channel and records dispatch.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    notifications: NotificationService,
    delivery: Arc<dyn NotificationDelivery>,
    timeout: Duration,
    batch_size: u32,
}

impl NotificationDispatcher {
    /// Create a dispatcher using the scheduler's timeout and batch size.
    pub fn new(
        notifications: NotificationService,
        delivery: Arc<dyn NotificationDelivery>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            notifications,
            delivery,
            timeout: config.delivery_timeout(),
            batch_size: config.batch_size,
        }
    }

    /// Deliver up to one batch of due notifications.
    ///
    /// Only loading the batch can fail the pass. A failure on one
    /// notification is logged and the rest of the batch continues; the
    /// failed row is recorded so the next pass reaches rows behind it.
    pub async fn dispatch_due(&self) -> AppResult<DispatchReport> {
        let due = self.notifications.due(self.batch_size).await?;
        let mut report = DispatchReport {
            attempted: due.len(),
            ..DispatchReport::default()
        };

        for notification in &due {
            let outcome = match time::timeout(self.timeout, self.delivery.deliver(notification)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::dispatch_failure(format!(
                    "Delivery timed out after {}s",
                    self.timeout.as_secs()
                ))),
            };

            if let Err(e) = outcome {
                warn!(
                    notification_id = %notification.id,
                    attempt = notification.failed_attempts + 1,
                    error = %e,
                    "Notification dispatch failed; will retry"
                );
                report.failed += 1;
                if let Err(e) = self.notifications.mark_failed(notification.id).await {
                    warn!(
                        notification_id = %notification.id,
                        error = %e,
                        "Failed dispatch could not be recorded"
                    );
                }
                continue;
            }

            match self.notifications.mark_sent(notification.id).await {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    warn!(
                        notification_id = %notification.id,
                        error = %e,
                        "Delivered notification could not be marked sent"
                    );
                    report.failed += 1;
                }
            }
        }

        debug!(
            attempted = report.attempted,
            sent = report.sent,
            failed = report.failed,
            "Dispatch pass finished"
        );
        Ok(report)
    }
}
