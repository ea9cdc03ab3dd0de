//! JSON-over-HTTP bridge to the message broker.
//!
//! Each request is `POST {base_url}/{address}` with the payload as the JSON body. A 2xx
//! response body is the reply. Any other status carries a [`RemoteError`] body; when the
//! body has no usable code the HTTP status is used instead.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::RpcTransport;
use crate::error::{RemoteError, RpcError};

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("filegate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, address: &str, payload: Value) -> Result<Value, RpcError> {
        let url = format!("{}/{}", self.base_url, address);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RpcError::Transport(format!("broker bridge unreachable: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RpcError::Transport(format!("failed to read reply: {}", e)))?;

        if status.is_success() {
            if body.is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&body).map_err(|e| RpcError::Decode {
                route: address.to_string(),
                message: e.to_string(),
            });
        }

        let remote = serde_json::from_slice::<RemoteError>(&body)
            .ok()
            .filter(|err| err.code != 0)
            .unwrap_or_else(|| {
                RemoteError::new(status.as_u16(), String::from_utf8_lossy(&body).into_owned())
            });
        Err(RpcError::Remote(remote))
    }
}
