//! Liveness endpoint for external uptime probes.

pub mod handlers;
pub mod routes;

use std::net::SocketAddr;

use tracing::{error, info};
use warnbot_core::config::LivenessConfig;

pub use routes::create_router;

/// Serves the liveness router until the process exits.
///
/// A bind failure is logged and the bot keeps running without the endpoint.
pub async fn serve_liveness(config: LivenessConfig) {
    let addr = SocketAddr::new(config.host, config.port);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind liveness endpoint");
            return;
        }
    };

    info!(%addr, "Liveness endpoint listening");
    if let Err(e) = axum::serve(listener, create_router()).await {
        error!(error = %e, "Liveness endpoint stopped");
    }
}
