//! Start/stop handle for the scheduler loop.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing;

use seatdesk_core::error::AppError;

use crate::runner::SchedulerRunner;

struct Running {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns the background task running a [`SchedulerRunner`].
pub struct NotificationScheduler {
    runner: Arc<SchedulerRunner>,
    running: Mutex<Option<Running>>,
}

impl std::fmt::Debug for NotificationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationScheduler")
            .field("running", &self.is_running())
            .finish()
    }
}

impl NotificationScheduler {
    /// Create a stopped scheduler
    pub fn new(runner: SchedulerRunner) -> Self {
        Self {
            runner: Arc::new(runner),
            running: Mutex::new(None),
        }
    }

    /// Spawn the loop. Fails with `Conflict` if it is already running.
    pub fn start(&self) -> Result<(), AppError> {
        let mut running = self.lock();
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return Err(AppError::conflict("Notification scheduler is already running"));
        }

        let (cancel, rx) = watch::channel(false);
        let runner = Arc::clone(&self.runner);
        let handle = tokio::spawn(async move { runner.run(rx).await });
        *running = Some(Running { cancel, handle });

        tracing::info!("Notification scheduler task spawned");
        Ok(())
    }

    /// Signal the loop to stop and wait for the current tick to finish.
    /// Fails with `Conflict` if it is not running.
    pub async fn stop(&self) -> Result<(), AppError> {
        let Some(Running { cancel, handle }) = self.lock().take() else {
            return Err(AppError::conflict("Notification scheduler is not running"));
        };

        let _ = cancel.send(true);
        handle
            .await
            .map_err(|e| AppError::internal(format!("Scheduler task failed: {e}")))?;

        tracing::info!("Notification scheduler shut down");
        Ok(())
    }

    /// Whether the loop task is alive.
    pub fn is_running(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(|e| e.into_inner())
    }
}
