//! Error types module
//!
//! All gateway failures are unified under [`AppError`]. Each variant describes how it is
//! presented over HTTP through the [`ErrorMetadata`] trait, so handlers only decide *which*
//! error happened and never how it is rendered.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like backend timeouts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "REMOTE_TIMEOUT")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid parameter {param}: {message}")]
    Validation { param: String, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("No reply from {route} within {timeout_ms}ms")]
    RemoteTimeout { route: String, timeout_ms: u64 },

    #[error("Backend error {code}: {message}")]
    Remote { code: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Preview codec error: {0}")]
    Codec(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Shorthand for a validation failure on a named request parameter.
    pub fn validation(param: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Validation { .. } => "Validation",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::PaymentRequired(_) => "PaymentRequired",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::PreconditionFailed(_) => "PreconditionFailed",
            AppError::RemoteTimeout { .. } => "RemoteTimeout",
            AppError::Remote { .. } => "Remote",
            AppError::Transport(_) => "Transport",
            AppError::Codec(_) => "Codec",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let param = err
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "body".to_string());
        AppError::Validation {
            param,
            message: format!("Validation error: {}", err),
        }
    }
}

/// Remote codes outside the HTTP error range are reported as a bad gateway.
fn remote_status(code: u16) -> u16 {
    if (400..=599).contains(&code) {
        code
    } else {
        502
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Validation { .. } => (
            400,
            "VALIDATION_ERROR",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check authentication token"),
            false,
            LogLevel::Debug,
        ),
        AppError::PaymentRequired(_) => (
            402,
            "PAYMENT_REQUIRED",
            false,
            Some("Upgrade plan to get more models"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            None,
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the file id and owner alias"),
            false,
            LogLevel::Debug,
        ),
        AppError::PreconditionFailed(_) => (
            412,
            "PRECONDITION_FAILED",
            true,
            Some("Retry once processing has finished"),
            false,
            LogLevel::Debug,
        ),
        AppError::RemoteTimeout { .. } => (
            504,
            "REMOTE_TIMEOUT",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Warn,
        ),
        AppError::Remote { code, .. } => {
            let status = remote_status(*code);
            if status < 500 {
                (status, "REMOTE_ERROR", false, None, false, LogLevel::Debug)
            } else {
                (
                    status,
                    "REMOTE_ERROR",
                    true,
                    Some("Retry after a short delay"),
                    true,
                    LogLevel::Error,
                )
            }
        }
        AppError::Transport(_) => (
            502,
            "TRANSPORT_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Codec(_) => (
            502,
            "CODEC_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation { param, message } => format!("{}: {}", param, message),
            AppError::Unauthorized(msg)
            | AppError::PaymentRequired(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::PreconditionFailed(msg) => msg.clone(),
            AppError::RemoteTimeout { .. } => "Backend did not reply in time".to_string(),
            AppError::Remote { code, message } if remote_status(*code) < 500 => message.clone(),
            AppError::Remote { .. } | AppError::Transport(_) => {
                "Backend service unavailable".to_string()
            }
            AppError::Codec(_) => "Failed to render preview".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_client_errors_keep_backend_status_and_message() {
        let err = AppError::Remote {
            code: 409,
            message: "upload already finished".to_string(),
        };
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.client_message(), "upload already finished");
        assert!(!err.is_sensitive());
    }

    #[test]
    fn remote_server_errors_are_hidden() {
        let err = AppError::Remote {
            code: 500,
            message: "redis://10.0.0.3:6379 refused".to_string(),
        };
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("redis"));
    }

    #[test]
    fn non_http_remote_code_maps_to_bad_gateway() {
        let err = AppError::Remote {
            code: 7,
            message: "weird".to_string(),
        };
        assert_eq!(err.http_status_code(), 502);
    }

    #[test]
    fn timeout_is_gateway_timeout() {
        let err = AppError::RemoteTimeout {
            route: "files.list".to_string(),
            timeout_ms: 5000,
        };
        assert_eq!(err.http_status_code(), 504);
        assert_eq!(err.error_code(), "REMOTE_TIMEOUT");
        assert!(!err.client_message().contains("files.list"));
    }

    #[test]
    fn validation_names_parameter() {
        let err = AppError::validation("filter", "must be a JSON object");
        assert_eq!(err.http_status_code(), 400);
        assert!(err.client_message().starts_with("filter"));
    }
}
