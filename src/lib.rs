// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod random;
pub mod snapshot;
pub mod upstream;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, aggregate_with, AggregateRecord, MessageStats, SortOrder};
pub use crate::api::{router, AppState};
pub use crate::error::{AppError, FetchError};
pub use crate::fetcher::Fetcher;

/// Build the router exactly as the server does, from `AppConfig::load()`.
pub fn app() -> anyhow::Result<axum::Router> {
    let cfg = config::AppConfig::load()?;
    tracing::info!(
        upstream = %cfg.upstream_url,
        max_iterations = cfg.max_iterations,
        "app configured"
    );
    Ok(router(AppState::from_config(&cfg)))
}
