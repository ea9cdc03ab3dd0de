//! Service initialization and application state setup

use std::sync::Arc;

use anyhow::{Context, Result};
use filegate_core::config::RpcTransportKind;
use filegate_core::projection::ResourceProjector;
use filegate_core::Config;
use filegate_rpc::transport::{HttpTransport, InProcessBroker};
use filegate_rpc::{RouteRegistry, RpcClient, RpcTransport};

use crate::services::{HttpPreviewCodec, PreviewCodec, QuotaService, UnavailableCodec};
use crate::state::AppState;

/// Build the RPC transport and preview codec from configuration, then the state.
pub fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let transport: Arc<dyn RpcTransport> = match config.rpc_transport() {
        RpcTransportKind::Http => {
            let url = config
                .rpc_http_url()
                .context("RPC_HTTP_URL must be set when RPC_TRANSPORT=http")?;
            tracing::info!(url = %url, "Using HTTP broker bridge");
            Arc::new(HttpTransport::new(url)?)
        }
        RpcTransportKind::Memory => {
            tracing::warn!("Using in-process broker; no backend consumers are registered");
            Arc::new(InProcessBroker::new())
        }
    };

    let codec: Arc<dyn PreviewCodec> = match config.preview_codec_url() {
        Some(url) => {
            tracing::info!(url = %url, "Preview codec configured");
            Arc::new(HttpPreviewCodec::new(url)?)
        }
        None => {
            tracing::warn!("PREVIEW_CODEC_URL not set; preview endpoints will fail");
            Arc::new(UnavailableCodec)
        }
    };

    Ok(build_state(config, transport, codec))
}

/// Assemble the application state around an already-built transport and codec.
pub fn build_state(
    config: &Config,
    transport: Arc<dyn RpcTransport>,
    codec: Arc<dyn PreviewCodec>,
) -> Arc<AppState> {
    let registry = RouteRegistry::new(config.routes().clone());
    let rpc = RpcClient::new(transport, registry);
    let quota = QuotaService::new(
        rpc.clone(),
        config.quota().audience.clone(),
        config.quota().refund_timeout_ms,
    );

    Arc::new(AppState {
        config: config.clone(),
        projector: ResourceProjector::new(config.files_base_url(), config.users_base_url()),
        rpc,
        quota,
        codec,
    })
}
