//! Shared application state.

use std::sync::Arc;

use filegate_core::projection::ResourceProjector;
use filegate_core::Config;
use filegate_rpc::RpcClient;

use crate::services::codec::PreviewCodec;
use crate::services::quota::QuotaService;

/// Everything a handler needs, built once at startup and shared behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub rpc: RpcClient,
    pub projector: ResourceProjector,
    pub quota: QuotaService,
    pub codec: Arc<dyn PreviewCodec>,
}

impl AppState {
    /// Absolute base URL of the files resource.
    pub fn files_base_url(&self) -> &str {
        self.projector.files_base_url()
    }
}
