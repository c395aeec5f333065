//! PR Reviewer - reviewer assignment and pull request lifecycle service.
//!
//! Teams own users; pull requests get up to two reviewers from the author's
//! team when they are opened. Reviewers can be swapped while a pull request
//! is open, and merging freezes the assignment.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use config::Config;
use error::AppError;
use services::{ReviewerSelector, Services};
use store::SqliteStore;
use tokio_util::sync::CancellationToken;

/// Build the services on top of a SQLite store.
pub async fn build_services(config: &Config) -> Result<Services, AppError> {
    let pool = db::initialize(&config.database_path, config.max_connections).await?;
    let store = Arc::new(SqliteStore::new(pool));
    let selector = ReviewerSelector::new(config.reviewer_seed);

    if config.reviewer_seed.is_some() {
        log::warn!("[server] Reviewer selection is seeded and therefore deterministic");
    }

    Ok(Services::new(store, selector, config.max_update_attempts))
}

/// Initialize storage and serve the API until Ctrl-C.
pub async fn run(config: Config) -> Result<(), AppError> {
    let services = build_services(&config).await?;

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let listener = server::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    let shutdown = CancellationToken::new();
    server::cancel_on_ctrl_c(shutdown.clone());

    server::serve(listener, services, shutdown)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))
}
