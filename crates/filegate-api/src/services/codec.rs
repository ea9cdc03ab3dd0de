//! Preview image codec client.
//!
//! The codec renders a stored preview with the requested modifiers and format. Bytes are
//! piped straight through to the client; nothing is buffered in the gateway.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use filegate_core::AppError;
use futures::{Stream, StreamExt};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

#[async_trait]
pub trait PreviewCodec: Send + Sync {
    /// Start rendering `path` (modifiers joined with the stored preview path) as `format`.
    ///
    /// Errors before the first byte surface as `AppError`; an error after that ends the
    /// stream with an `io::Error`.
    async fn render(&self, path: &str, format: &str) -> Result<ByteStream, AppError>;
}

/// Codec reached over HTTP: `GET {base}/{path}?format={format}`.
pub struct HttpPreviewCodec {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPreviewCodec {
    pub fn new(base_url: impl Into<String>) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PreviewCodec for HttpPreviewCodec {
    async fn render(&self, path: &str, format: &str) -> Result<ByteStream, AppError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("format", format)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, path = %path, "Preview codec request failed");
                AppError::Codec(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), path = %path, "Preview codec refused request");
            return Err(AppError::Codec(format!("codec replied with status {}", status)));
        }

        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| std::io::Error::other(format!("Preview codec stream error: {}", e)))
        });
        Ok(Box::pin(stream))
    }
}

/// Stand-in used when no codec is configured; every preview fails with a codec error.
pub struct UnavailableCodec;

#[async_trait]
impl PreviewCodec for UnavailableCodec {
    async fn render(&self, _path: &str, _format: &str) -> Result<ByteStream, AppError> {
        Err(AppError::Codec("preview codec is not configured".to_string()))
    }
}
