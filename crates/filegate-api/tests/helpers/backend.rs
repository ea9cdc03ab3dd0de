//! Scripted file backend on the in-process broker.
//!
//! Every queue handler records the payload it received, so tests can assert both on the
//! HTTP response and on what the gateway sent downstream.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use filegate_rpc::transport::InProcessBroker;
use filegate_rpc::RemoteError;
use serde_json::Value;

type CallLog = Arc<Mutex<Vec<(String, Value)>>>;

#[derive(Clone, Default)]
pub struct Backend {
    pub broker: InProcessBroker,
    calls: CallLog,
}

impl Backend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request on `address` with `reply`.
    pub async fn reply(&self, address: &str, reply: Result<Value, RemoteError>) {
        self.reply_with(address, move |_| reply.clone()).await;
    }

    /// Answer requests on `address` with a reply computed from the payload.
    pub async fn reply_with<F>(&self, address: &str, respond: F)
    where
        F: Fn(&Value) -> Result<Value, RemoteError> + Send + Sync + 'static,
    {
        let calls = Arc::clone(&self.calls);
        let queue = address.to_string();
        let respond = Arc::new(respond);
        self.broker
            .register(address, move |payload: Value| {
                let calls = Arc::clone(&calls);
                let queue = queue.clone();
                let respond = Arc::clone(&respond);
                async move {
                    let reply = respond(&payload);
                    calls.lock().unwrap().push((queue, payload));
                    reply
                }
            })
            .await;
    }

    /// Accept requests on `address` but never answer in time.
    pub async fn stall(&self, address: &str) {
        let calls = Arc::clone(&self.calls);
        let queue = address.to_string();
        self.broker
            .register(address, move |payload: Value| {
                let calls = Arc::clone(&calls);
                let queue = queue.clone();
                async move {
                    calls.lock().unwrap().push((queue, payload));
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(Value::Null)
                }
            })
            .await;
    }

    /// Payloads received on `address`, in arrival order.
    pub fn calls(&self, address: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(queue, _)| queue == address)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}
