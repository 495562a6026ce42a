//! Scheduler runner: the tick loop that dispatches due notifications and
//! runs the subscription expiry check.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::time;
use tracing;

use seatdesk_core::config::SchedulerConfig;
use seatdesk_core::traits::Clock;

use crate::dispatch::NotificationDispatcher;
use crate::jobs::SubscriptionExpiryCheck;

/// Runs scheduler ticks until the cancel signal is received.
#[derive(Debug)]
pub struct SchedulerRunner {
    dispatcher: NotificationDispatcher,
    expiry: SubscriptionExpiryCheck,
    config: SchedulerConfig,
    clock: Arc<dyn Clock>,
}

impl SchedulerRunner {
    /// Create a new runner
    pub fn new(
        dispatcher: NotificationDispatcher,
        expiry: SubscriptionExpiryCheck,
        config: SchedulerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            dispatcher,
            expiry,
            config,
            clock,
        }
    }

    /// Run until `cancel` flips to `true` or its sender is dropped.
    ///
    /// The signal is only observed while waiting; a tick in progress
    /// always finishes its batch.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            initial_delay_secs = self.config.initial_delay_seconds,
            interval_secs = self.config.loop_interval().as_secs(),
            batch_size = self.config.batch_size,
            "Notification scheduler started"
        );

        if wait_or_cancel(&mut cancel, self.config.initial_delay()).await {
            tracing::info!("Notification scheduler stopped before first tick");
            return;
        }

        let mut last_check: Option<NaiveDate> = None;
        loop {
            self.tick(&mut last_check).await;

            if wait_or_cancel(&mut cancel, self.config.loop_interval()).await {
                break;
            }
        }

        tracing::info!("Notification scheduler stopped");
    }

    /// One iteration: dispatch due notifications, then the expiry check
    /// if it is due. Errors are logged and never end the loop.
    pub async fn tick(&self, last_check: &mut Option<NaiveDate>) {
        match self.dispatcher.dispatch_due().await {
            Ok(report) if report.attempted > 0 => {
                tracing::info!(
                    attempted = report.attempted,
                    sent = report.sent,
                    failed = report.failed,
                    "Dispatched due notifications"
                );
            }
            Ok(_) => tracing::trace!("No notifications due"),
            Err(e) => tracing::error!(error = %e, "Failed to load due notifications"),
        }

        if !self.config.subscription_checks_enabled {
            return;
        }

        let today = self.clock.now().date_naive();
        if self.config.subscription_checks_daily && *last_check == Some(today) {
            return;
        }

        match self.expiry.run().await {
            Ok(_) => *last_check = Some(today),
            Err(e) => tracing::error!(error = %e, "Subscription expiry check failed"),
        }
    }
}

/// Sleep for `duration` unless cancelled first. Returns `true` on cancel.
async fn wait_or_cancel(cancel: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    if *cancel.borrow() {
        return true;
    }

    let sleep = time::sleep(duration);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    return true;
                }
            }
        }
    }
}
