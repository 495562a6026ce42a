//! SeatDesk Server: library seat rental backend.
//!
//! Main entry point that wires all crates together and runs the
//! notification scheduler until a shutdown signal arrives.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use seatdesk_core::config::AppConfig;
use seatdesk_core::error::AppError;
use seatdesk_core::traits::{Clock, StaticLibraryDirectory, SystemClock};
use seatdesk_database::DatabasePool;
use seatdesk_database::repositories::{
    BookingRepository, NotificationRepository, PaymentRepository, SubscriptionRepository,
};
use seatdesk_service::{
    BookingLocks, BookingService, EventBus, NotificationService, PaymentService, ReminderPolicy,
};
use seatdesk_worker::{
    LogDelivery, NotificationDispatcher, NotificationScheduler, SchedulerRunner,
    SubscriptionExpiryCheck,
};

#[tokio::main]
async fn main() {
    let env = std::env::var("SEATDESK_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SeatDesk v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    db.migrate().await?;

    let booking_repo = Arc::new(BookingRepository::new(db.pool().clone()));
    let payment_repo = Arc::new(PaymentRepository::new(db.pool().clone()));
    let notification_repo = Arc::new(NotificationRepository::new(db.pool().clone()));
    let subscription_repo = Arc::new(SubscriptionRepository::new(db.pool().clone()));

    // ── Step 2: Shared collaborators ─────────────────────────────
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let events = EventBus::default();
    let locks = BookingLocks::new();

    let directory = config
        .libraries
        .iter()
        .fold(StaticLibraryDirectory::new(), |dir, lib| {
            dir.with_library(lib.id, lib.total_seats)
        });
    tracing::info!(libraries = config.libraries.len(), "Library directory loaded");

    spawn_event_logger(&events);

    // ── Step 3: Services ─────────────────────────────────────────
    let payments = PaymentService::new(
        booking_repo.clone(),
        payment_repo,
        locks.clone(),
        config.payment.clone(),
        Arc::clone(&clock),
        events.clone(),
    );
    let bookings = BookingService::new(
        booking_repo,
        Arc::new(directory),
        payments,
        locks,
        Arc::clone(&clock),
        events,
        config.payment.currency.clone(),
    );
    let notifications = NotificationService::new(
        notification_repo,
        ReminderPolicy::new(&config.reminders),
        Arc::clone(&clock),
    );

    // ── Step 4: Notification scheduler ───────────────────────────
    let dispatcher =
        NotificationDispatcher::new(notifications.clone(), Arc::new(LogDelivery), &config.scheduler);
    let expiry = SubscriptionExpiryCheck::new(
        subscription_repo,
        bookings,
        notifications,
        Arc::clone(&clock),
        config.scheduler.expiry_warning_days,
    );
    let scheduler = NotificationScheduler::new(SchedulerRunner::new(
        dispatcher,
        expiry,
        config.scheduler.clone(),
        clock,
    ));

    if config.scheduler.enabled {
        scheduler.start()?;
    } else {
        tracing::info!("Notification scheduler disabled");
    }

    // ── Step 5: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    if scheduler.is_running() {
        scheduler.stop().await?;
    }
    db.close().await;

    tracing::info!("SeatDesk shut down complete");
    Ok(())
}

/// Log every domain event at debug level.
fn spawn_event_logger(events: &EventBus) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => tracing::debug!(
                    event_id = %event.id,
                    timestamp = %event.timestamp,
                    payload = ?event.payload,
                    "Domain event"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event logger lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
