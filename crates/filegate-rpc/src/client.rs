//! Request/reply client.
//!
//! Every call is a single exchange bounded by the route's timeout. There are no retries;
//! callers decide per remote code what a failure means for them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use filegate_core::Operation;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::RpcError;
use crate::registry::{RouteDescriptor, RouteRegistry};

/// Carries one request to a queue address and returns the peer's reply.
///
/// Implementations do not enforce timeouts; [`RpcClient`] bounds every call.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn request(&self, address: &str, payload: Value) -> Result<Value, RpcError>;
}

#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn RpcTransport>,
    registry: RouteRegistry,
}

impl RpcClient {
    pub fn new(transport: Arc<dyn RpcTransport>, registry: RouteRegistry) -> Self {
        Self {
            transport,
            registry,
        }
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn resolve(&self, operation: Operation) -> RouteDescriptor {
        self.registry.resolve(operation)
    }

    /// Send `payload` to `address` and wait at most `timeout_ms` for the reply.
    pub async fn call(&self, address: &str, payload: Value, timeout_ms: u64) -> Result<Value, RpcError> {
        tracing::debug!(address = %address, timeout_ms, "Publishing RPC request");

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.transport.request(address, payload),
        )
        .await;

        match result {
            Ok(Ok(reply)) => {
                tracing::debug!(
                    address = %address,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "RPC reply received"
                );
                Ok(reply)
            }
            Ok(Err(err)) => {
                tracing::debug!(address = %address, error = %err, "RPC request failed");
                Err(err)
            }
            Err(_) => {
                tracing::warn!(address = %address, timeout_ms, "RPC request timed out");
                Err(RpcError::Timeout {
                    route: address.to_string(),
                    timeout_ms,
                })
            }
        }
    }

    /// Call `operation` with the route's own timeout.
    pub async fn call_route<P: Serialize>(&self, operation: Operation, payload: &P) -> Result<Value, RpcError> {
        let route = self.registry.resolve(operation);
        self.call_route_with_timeout(operation, payload, route.timeout_ms)
            .await
    }

    /// Call `operation` with an explicit timeout instead of the configured one.
    pub async fn call_route_with_timeout<P: Serialize>(
        &self,
        operation: Operation,
        payload: &P,
        timeout_ms: u64,
    ) -> Result<Value, RpcError> {
        let route = self.registry.resolve(operation);
        let payload = serde_json::to_value(payload).map_err(|e| RpcError::Encode {
            route: route.address.clone(),
            message: e.to_string(),
        })?;
        self.call(&route.address, payload, timeout_ms).await
    }

    /// Call `operation` and decode the reply into `R`.
    pub async fn call_typed<P, R>(&self, operation: Operation, payload: &P) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let reply = self.call_route(operation, payload).await?;
        serde_json::from_value(reply).map_err(|e| RpcError::Decode {
            route: operation.name().to_string(),
            message: e.to_string(),
        })
    }
}
