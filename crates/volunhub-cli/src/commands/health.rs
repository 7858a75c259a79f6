//! Database connectivity check.

use std::time::Instant;

use tracing::{info, warn};

use crate::output;
use volunhub_core::config::AppConfig;
use volunhub_core::error::AppError;

/// Execute the health check
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let started = Instant::now();
    let store = super::open_store(config).await?;
    let healthy = store.db.health_check().await;
    store.close().await;

    let healthy = healthy.inspect_err(|e| warn!(error = %e, "Health check failed"))?;
    if !healthy {
        return Err(AppError::internal("Database answered the health check incorrectly"));
    }

    let round_trip_ms = started.elapsed().as_millis() as u64;
    info!(round_trip_ms, "Database is reachable");

    output::print_success("Database is reachable.");
    output::print_kv("Max connections", &config.database.max_connections.to_string());
    output::print_kv(
        "Acquire timeout",
        &format!("{}s", config.database.acquire_timeout_seconds),
    );
    output::print_kv(
        "Round trip",
        &format!("{round_trip_ms}ms"),
    );
    Ok(())
}
