//! HTTP server bootstrap.
//!
//! Binds the API router and serves it until the cancellation token fires.

use crate::api::{self, AppState};
use crate::services::Services;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Build the full application router.
pub fn app(services: Services) -> Router {
    api::routes(AppState { services }).layer(TraceLayer::new_for_http())
}

/// Bind `addr`, returning the listener so callers can read the actual port.
pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("[server] Listening on http://{}", listener.local_addr()?);
    Ok(listener)
}

/// Serve requests on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    services: Services,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    // Stop accepting connections once the token fires; in-flight requests finish
    axum::serve(listener, app(services))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await?;

    log::info!("[server] Server stopped");
    Ok(())
}

/// Cancel `token` on Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::info!("[server] Shutdown requested"),
            Err(e) => log::error!("[server] Failed to listen for Ctrl-C: {}", e),
        }
        token.cancel();
    });
}
