//! In-process broker.
//!
//! Each registered queue gets a bounded channel and a consumer task. Requests carry a
//! oneshot reply channel, so the request/reply exchange matches a real broker: the caller
//! only sees a reply once the consumer answers, and a consumer that never answers is
//! observed as a timeout by [`RpcClient`](crate::RpcClient).

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::client::RpcTransport;
use crate::error::{RemoteError, RpcError};

const QUEUE_CAPACITY: usize = 256;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, RemoteError>> + Send>>;

/// Consumer of a single queue.
pub type QueueHandler = Arc<dyn Fn(Value) -> HandlerFuture + Send + Sync>;

struct Envelope {
    payload: Value,
    reply: oneshot::Sender<Result<Value, RemoteError>>,
}

#[derive(Clone, Default)]
pub struct InProcessBroker {
    queues: Arc<RwLock<HashMap<String, mpsc::Sender<Envelope>>>>,
}

impl InProcessBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` as the consumer of `address`, replacing any previous consumer.
    /// Must be called from within a tokio runtime.
    pub async fn register<F, Fut>(&self, address: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
    {
        let address = address.into();
        let (tx, mut rx) = mpsc::channel::<Envelope>(QUEUE_CAPACITY);
        let consumer: QueueHandler =
            Arc::new(move |payload| -> HandlerFuture { Box::pin(handler(payload)) });

        let queue = address.clone();
        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let consumer = Arc::clone(&consumer);
                tokio::spawn(async move {
                    let result = consumer(envelope.payload).await;
                    // the requester may have timed out and dropped the receiver
                    let _ = envelope.reply.send(result);
                });
            }
            tracing::debug!(queue = %queue, "Queue consumer stopped");
        });

        self.queues.write().await.insert(address, tx);
    }

    /// Remove the consumer of `address`. Pending requests fail with a transport error.
    pub async fn unregister(&self, address: &str) {
        self.queues.write().await.remove(address);
    }
}

#[async_trait]
impl RpcTransport for InProcessBroker {
    async fn request(&self, address: &str, payload: Value) -> Result<Value, RpcError> {
        let sender = self
            .queues
            .read()
            .await
            .get(address)
            .cloned()
            .ok_or_else(|| RpcError::Transport(format!("no consumer bound to queue {}", address)))?;

        let (reply, receiver) = oneshot::channel();
        sender
            .send(Envelope { payload, reply })
            .await
            .map_err(|_| RpcError::Transport(format!("queue {} is closed", address)))?;

        receiver
            .await
            .map_err(|_| RpcError::Transport(format!("consumer of {} dropped the reply", address)))?
            .map_err(RpcError::Remote)
    }
}
