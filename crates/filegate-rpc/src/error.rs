use filegate_core::AppError;
use serde::{Deserialize, Serialize};

/// Structured failure returned by a backend peer. The code is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl RemoteError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            name: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> RemoteCode {
        RemoteCode::from(self.code)
    }
}

/// Remote codes the gateway reacts to specifically. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCode {
    /// Still processing; a degraded success for some callers.
    Accepted,
    PaymentRequired,
    Forbidden,
    NotFound,
    /// The record exists but a derived artifact is not ready.
    PreconditionFailed,
    Other(u16),
}

impl From<u16> for RemoteCode {
    fn from(code: u16) -> Self {
        match code {
            202 => RemoteCode::Accepted,
            402 => RemoteCode::PaymentRequired,
            403 => RemoteCode::Forbidden,
            404 => RemoteCode::NotFound,
            412 => RemoteCode::PreconditionFailed,
            other => RemoteCode::Other(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("no reply from {route} within {timeout_ms}ms")]
    Timeout { route: String, timeout_ms: u64 },

    #[error("remote error {}: {}", .0.code, .0.message)]
    Remote(RemoteError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to encode request for {route}: {message}")]
    Encode { route: String, message: String },

    #[error("failed to decode reply from {route}: {message}")]
    Decode { route: String, message: String },
}

impl RpcError {
    /// The remote code class, when this is a structured backend failure.
    pub fn remote_code(&self) -> Option<RemoteCode> {
        match self {
            RpcError::Remote(err) => Some(err.kind()),
            _ => None,
        }
    }
}

impl From<RpcError> for AppError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Timeout { route, timeout_ms } => AppError::RemoteTimeout { route, timeout_ms },
            RpcError::Remote(remote) => match remote.kind() {
                RemoteCode::PaymentRequired => AppError::PaymentRequired(remote.message),
                RemoteCode::Forbidden => AppError::Forbidden(remote.message),
                RemoteCode::NotFound => AppError::NotFound(remote.message),
                RemoteCode::PreconditionFailed => AppError::PreconditionFailed(remote.message),
                RemoteCode::Accepted | RemoteCode::Other(_) => AppError::Remote {
                    code: remote.code,
                    message: remote.message,
                },
            },
            RpcError::Transport(message) => AppError::Transport(message),
            RpcError::Encode { route, message } => {
                AppError::Internal(format!("failed to encode request for {}: {}", route, message))
            }
            RpcError::Decode { route, message } => {
                AppError::Transport(format!("unexpected reply from {}: {}", route, message))
            }
        }
    }
}
