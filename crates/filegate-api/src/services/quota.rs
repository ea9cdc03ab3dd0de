//! Upload quota bookkeeping against the users service.
//!
//! A model slot is reserved before the upload is relayed and handed back when the
//! upload is refused for lack of quota. The refund is best effort: a failed refund is
//! logged for reconciliation and never masks the original failure.

use filegate_core::{AppError, Operation};
use filegate_rpc::{RemoteCode, RpcClient, RpcError};
use serde::Serialize;
use serde_json::Value;

/// `updateMetadata` request incrementing the `models` counter by `delta`.
#[derive(Debug, Serialize)]
struct ModelCounterUpdate<'a> {
    username: &'a str,
    audience: &'a str,
    metadata: CounterMetadata,
}

#[derive(Debug, Serialize)]
struct CounterMetadata {
    #[serde(rename = "$incr")]
    incr: ModelsDelta,
}

#[derive(Debug, Serialize)]
struct ModelsDelta {
    models: i64,
}

impl<'a> ModelCounterUpdate<'a> {
    fn new(username: &'a str, audience: &'a str, delta: i64) -> Self {
        Self {
            username,
            audience,
            metadata: CounterMetadata {
                incr: ModelsDelta { models: delta },
            },
        }
    }
}

/// Counter value after the increment, as replied by the users service.
fn counter_after(reply: &Value) -> Option<i64> {
    reply.pointer("/$incr/models").and_then(Value::as_i64)
}

#[derive(Clone)]
pub struct QuotaService {
    rpc: RpcClient,
    audience: String,
    refund_timeout_ms: u64,
}

impl QuotaService {
    pub fn new(rpc: RpcClient, audience: impl Into<String>, refund_timeout_ms: u64) -> Self {
        Self {
            rpc,
            audience: audience.into(),
            refund_timeout_ms,
        }
    }

    /// Take one model slot from `username`.
    ///
    /// Fails with `PaymentRequired` when the counter drops below zero or the users
    /// service refuses the decrement with 402; the slot is refunded before returning
    /// in both cases.
    pub async fn reserve(&self, username: &str) -> Result<(), AppError> {
        let request = ModelCounterUpdate::new(username, &self.audience, -1);
        let reply = match self.rpc.call_route(Operation::UpdateMetadata, &request).await {
            Ok(reply) => reply,
            Err(RpcError::Remote(err)) if err.kind() == RemoteCode::PaymentRequired => {
                tracing::info!(username = %username, "Model quota decrement refused");
                self.refund(username, "quota decrement refused").await;
                return Err(AppError::PaymentRequired(err.message));
            }
            Err(err) => return Err(AppError::from(err)),
        };

        match counter_after(&reply) {
            Some(remaining) if remaining < 0 => {
                tracing::info!(username = %username, remaining, "Model quota exhausted");
                self.refund(username, "quota exhausted").await;
                Err(AppError::PaymentRequired(
                    "no more models are available".to_string(),
                ))
            }
            Some(remaining) => {
                tracing::debug!(username = %username, remaining, "Model slot reserved");
                Ok(())
            }
            None => {
                tracing::warn!(username = %username, "Quota reply carried no models counter");
                Ok(())
            }
        }
    }

    /// Give one model slot back. Never fails; failures go to the reconciliation log.
    pub async fn refund(&self, username: &str, reason: &str) {
        let request = ModelCounterUpdate::new(username, &self.audience, 1);
        let result = self
            .rpc
            .call_route_with_timeout(Operation::UpdateMetadata, &request, self.refund_timeout_ms)
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(username = %username, reason = %reason, "Model slot refunded");
            }
            Err(err) => log_failed_refund(username, &self.audience, reason, &err),
        }
    }
}

fn log_failed_refund(username: &str, audience: &str, reason: &str, err: &RpcError) {
    tracing::error!(
        target: "filegate::reconciliation",
        username = %username,
        audience = %audience,
        reason = %reason,
        error = %err,
        "Model quota refund failed; counter needs manual reconciliation"
    );
}
