//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use seatdesk_core::error::{AppError, ErrorKind};

/// Apply the booking, payment, notification, and subscription schema.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations");

    let migrator = sqlx::migrate!("../../migrations");
    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!(
        applied = migrator.iter().count(),
        "Database schema is up to date"
    );
    Ok(())
}
