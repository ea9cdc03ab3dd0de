//! Route table reload.
//!
//! On SIGHUP the `.env` file is re-read and the route table rebuilt from the environment.
//! The new table is validated before it replaces the current one; a bad table is logged
//! and the old one stays in place.

use filegate_core::RoutesConfig;
use filegate_rpc::RouteRegistry;
use tokio::task::JoinHandle;

/// Rebuild the route table from the environment and install it.
pub fn reload_routes(registry: &RouteRegistry) -> Result<(), anyhow::Error> {
    dotenvy::dotenv_override().ok();
    let routes = RoutesConfig::from_env();
    registry.reconfigure(routes)
}

#[cfg(unix)]
pub fn spawn_route_reloader(registry: RouteRegistry) -> Option<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(signal) => signal,
        Err(e) => {
            tracing::warn!(error = %e, "SIGHUP handler unavailable; route reload disabled");
            return None;
        }
    };

    Some(tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            tracing::info!("Received SIGHUP, reloading route table");
            if let Err(e) = reload_routes(&registry) {
                tracing::error!(error = %e, "Route table reload rejected; keeping current table");
            }
        }
    }))
}

#[cfg(not(unix))]
pub fn spawn_route_reloader(_registry: RouteRegistry) -> Option<JoinHandle<()>> {
    None
}
