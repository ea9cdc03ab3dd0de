//! Test helpers: build the router against a scripted backend and a stub codec.
//!
//! Run from workspace root: `cargo test -p filegate-api`.

#![allow(dead_code)]

pub mod auth;
pub mod backend;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use bytes::Bytes;
use filegate_api::services::{ByteStream, PreviewCodec};
use filegate_api::setup::{routes, services};
use filegate_core::config::GceConfig;
use filegate_core::{AppError, Config, GatewayConfig, RoutesConfig};

pub use backend::Backend;

pub const PUBLIC_HOST: &str = "https://api.example.com";
pub const PUBSUB_TOKEN: &str = "push-secret";

/// Codec that answers with fixed chunks and records the paths it was asked for.
#[derive(Clone, Default)]
pub struct StubCodec {
    pub requests: Arc<Mutex<Vec<(String, String)>>>,
    /// Break the stream after the first chunk, like a codec dropping its connection.
    pub fail_mid_stream: bool,
}

impl StubCodec {
    pub fn failing_mid_stream() -> Self {
        Self {
            fail_mid_stream: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl PreviewCodec for StubCodec {
    async fn render(&self, path: &str, format: &str) -> Result<ByteStream, AppError> {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), format.to_string()));

        let second = if self.fail_mid_stream {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "codec connection reset",
            ))
        } else {
            Ok(Bytes::from_static(b"bytes"))
        };
        let chunks: Vec<Result<Bytes, std::io::Error>> =
            vec![Ok(Bytes::from_static(b"preview-")), second];
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub backend: Backend,
    pub codec: StubCodec,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        public_host: PUBLIC_HOST.to_string(),
        routes: RoutesConfig {
            default_timeout_ms: 2_000,
            ..RoutesConfig::default()
        },
        gce: Some(GceConfig {
            channel: "channel-1".to_string(),
            resource_id: "resource-1".to_string(),
            token: "channel-token".to_string(),
            bucket: "models-bucket".to_string(),
        }),
        pubsub_token: Some(PUBSUB_TOKEN.to_string()),
        ..GatewayConfig::default()
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config(), StubCodec::default()).await
}

/// The full router over `backend` and `codec`, for tests that drive it without a server.
pub fn build_router(config: GatewayConfig, backend: &Backend, codec: &StubCodec) -> Router {
    let config: Config = config.into();
    let state = services::build_state(
        &config,
        Arc::new(backend.broker.clone()),
        Arc::new(codec.clone()),
    );
    routes::setup_routes(&config, state).expect("Failed to build routes")
}

pub async fn setup_test_app_with(config: GatewayConfig, codec: StubCodec) -> TestApp {
    let backend = Backend::new();
    let app = build_router(config, &backend, &codec);
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        backend,
        codec,
    }
}
