//! Application setup and initialization

pub mod reload;
pub mod routes;
pub mod server;
pub mod services;

use std::sync::Arc;

use anyhow::{Context, Result};
use filegate_core::Config;
use filegate_infra::{init_telemetry, LogFormat};

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    init_telemetry(
        "filegate-api",
        config.environment(),
        LogFormat::parse(config.log_format()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        attach_point = %config.files_attach_point(),
        transport = ?config.rpc_transport(),
        "Configuration loaded and validated successfully"
    );

    let state = services::initialize_services(&config)?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
