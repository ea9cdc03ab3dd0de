//! Configuration module
//!
//! Gateway configuration is read once from the environment (optionally seeded from a
//! `.env` file). The backend routing part lives in [`RoutesConfig`] so that it can be
//! reloaded and swapped as a whole without touching the rest of the configuration.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use crate::operation::{Operation, Service};

const SERVER_PORT: u16 = 3000;
const RPC_DEFAULT_TIMEOUT_MS: u64 = 15_000;
const QUOTA_DECREMENT_TIMEOUT_MS: u64 = 5_000;
const QUOTA_REFUND_TIMEOUT_MS: u64 = 10_000;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Queue addressing and reply timeouts for every backend operation.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutesConfig {
    pub files_prefix: String,
    pub users_prefix: String,
    /// Per-operation queue postfix; operations without an entry use their own name.
    pub postfixes: HashMap<Operation, String>,
    /// Per-operation reply timeout; operations without an entry use `default_timeout_ms`.
    pub timeouts_ms: HashMap<Operation, u64>,
    pub default_timeout_ms: u64,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        let mut timeouts_ms = HashMap::new();
        timeouts_ms.insert(Operation::UpdateMetadata, QUOTA_DECREMENT_TIMEOUT_MS);
        Self {
            files_prefix: "files".to_string(),
            users_prefix: "users".to_string(),
            postfixes: HashMap::new(),
            timeouts_ms,
            default_timeout_ms: RPC_DEFAULT_TIMEOUT_MS,
        }
    }
}

impl RoutesConfig {
    /// Reads `FILES_ROUTE_PREFIX`, `USERS_ROUTE_PREFIX`, `RPC_DEFAULT_TIMEOUT_MS` and the
    /// per-operation `*_ROUTE_POSTFIX_<OP>` / `*_TIMEOUT_<OP>_MS` overrides.
    pub fn from_env() -> Self {
        let defaults = RoutesConfig::default();
        let mut config = RoutesConfig {
            files_prefix: env_opt("FILES_ROUTE_PREFIX").unwrap_or(defaults.files_prefix),
            users_prefix: env_opt("USERS_ROUTE_PREFIX").unwrap_or(defaults.users_prefix),
            postfixes: HashMap::new(),
            timeouts_ms: defaults.timeouts_ms,
            default_timeout_ms: env_or("RPC_DEFAULT_TIMEOUT_MS", defaults.default_timeout_ms),
        };

        for op in Operation::ALL {
            let namespace = match op.service() {
                Service::Files => "FILES",
                Service::Users => "USERS",
            };
            if let Some(postfix) =
                env_opt(&format!("{}_ROUTE_POSTFIX_{}", namespace, op.env_suffix()))
            {
                config.postfixes.insert(op, postfix);
            }
            let timeout_key = match op {
                Operation::UpdateMetadata => "QUOTA_DECREMENT_TIMEOUT_MS".to_string(),
                _ => format!("{}_TIMEOUT_{}_MS", namespace, op.env_suffix()),
            };
            if let Some(timeout) = env_opt(&timeout_key).and_then(|v| v.parse().ok()) {
                config.timeouts_ms.insert(op, timeout);
            }
        }

        config
    }

    /// Queue address: namespace prefix joined with the operation postfix, e.g. `files.download`.
    pub fn address(&self, op: Operation) -> String {
        let prefix = match op.service() {
            Service::Files => &self.files_prefix,
            Service::Users => &self.users_prefix,
        };
        let postfix = self
            .postfixes
            .get(&op)
            .map(String::as_str)
            .unwrap_or_else(|| op.name());
        if prefix.is_empty() {
            postfix.to_string()
        } else {
            format!("{}.{}", prefix, postfix)
        }
    }

    pub fn timeout_ms(&self, op: Operation) -> u64 {
        self.timeouts_ms
            .get(&op)
            .copied()
            .unwrap_or(self.default_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.default_timeout_ms == 0 {
            return Err(anyhow::anyhow!("RPC_DEFAULT_TIMEOUT_MS must be greater than 0"));
        }
        if let Some((op, _)) = self.timeouts_ms.iter().find(|(_, t)| **t == 0) {
            return Err(anyhow::anyhow!("Timeout for operation '{}' must be greater than 0", op));
        }
        if let Some((op, _)) = self.postfixes.iter().find(|(_, p)| p.trim().is_empty()) {
            return Err(anyhow::anyhow!("Queue postfix for operation '{}' is empty", op));
        }
        Ok(())
    }
}

/// Which transport carries RPC traffic to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcTransportKind {
    /// JSON over HTTP to a broker bridge.
    Http,
    /// In-process broker; queues must be registered by the embedding application.
    Memory,
}

/// Upload quota bookkeeping on the users service.
#[derive(Clone, Debug)]
pub struct QuotaConfig {
    pub audience: String,
    pub refund_timeout_ms: u64,
}

/// Shared secrets for the storage change-notification hooks.
#[derive(Clone, Debug)]
pub struct GceConfig {
    pub channel: String,
    pub resource_id: String,
    pub token: String,
    pub bucket: String,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub http_concurrency_limit: usize,
    pub log_format: String,
    /// Public origin used to render absolute links, e.g. `https://api.example.com`.
    pub public_host: String,
    pub files_attach_point: String,
    pub users_attach_point: String,
    pub routes: RoutesConfig,
    pub rpc_transport: RpcTransportKind,
    pub rpc_http_url: Option<String>,
    pub preview_codec_url: Option<String>,
    pub quota: QuotaConfig,
    pub gce: Option<GceConfig>,
    pub pubsub_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            log_format: "text".to_string(),
            public_host: "http://localhost:3000".to_string(),
            files_attach_point: "/api/files".to_string(),
            users_attach_point: "/api/users".to_string(),
            routes: RoutesConfig::default(),
            rpc_transport: RpcTransportKind::Memory,
            rpc_http_url: None,
            preview_codec_url: None,
            quota: QuotaConfig {
                audience: "*.localhost".to_string(),
                refund_timeout_ms: QUOTA_REFUND_TIMEOUT_MS,
            },
            gce: None,
            pubsub_token: None,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = GatewayConfig::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or(defaults.environment);

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let rpc_transport = match env::var("RPC_TRANSPORT")
            .unwrap_or_else(|_| "http".to_string())
            .to_lowercase()
            .as_str()
        {
            "http" => RpcTransportKind::Http,
            "memory" => RpcTransportKind::Memory,
            other => {
                return Err(anyhow::anyhow!(
                    "RPC_TRANSPORT must be 'http' or 'memory', got '{}'",
                    other
                ))
            }
        };

        // All four secrets are required together; a partial set disables the hook.
        let gce = match (
            env_opt("GCE_CHANNEL"),
            env_opt("GCE_RESOURCE_ID"),
            env_opt("GCE_TOKEN"),
            env_opt("GCE_BUCKET"),
        ) {
            (Some(channel), Some(resource_id), Some(token), Some(bucket)) => Some(GceConfig {
                channel,
                resource_id,
                token,
                bucket,
            }),
            _ => None,
        };

        let config = GatewayConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            http_concurrency_limit: env_or("HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT)
                .max(1),
            log_format: env_opt("LOG_FORMAT").unwrap_or(defaults.log_format),
            public_host: env_opt("PUBLIC_HOST")
                .unwrap_or(defaults.public_host)
                .trim_end_matches('/')
                .to_string(),
            files_attach_point: env_opt("FILES_ATTACH_POINT")
                .unwrap_or(defaults.files_attach_point),
            users_attach_point: env_opt("USERS_ATTACH_POINT")
                .unwrap_or(defaults.users_attach_point),
            routes: RoutesConfig::from_env(),
            rpc_transport,
            rpc_http_url: env_opt("RPC_HTTP_URL"),
            preview_codec_url: env_opt("PREVIEW_CODEC_URL"),
            quota: QuotaConfig {
                audience: env_opt("USERS_AUDIENCE").unwrap_or(defaults.quota.audience),
                refund_timeout_ms: env_or("QUOTA_REFUND_TIMEOUT_MS", QUOTA_REFUND_TIMEOUT_MS),
            },
            gce,
            pubsub_token: env_opt("PUBSUB_TOKEN"),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.public_host.starts_with("http://") && !self.public_host.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "PUBLIC_HOST must be an absolute http(s) origin"
            ));
        }

        for (key, value) in [
            ("FILES_ATTACH_POINT", &self.files_attach_point),
            ("USERS_ATTACH_POINT", &self.users_attach_point),
        ] {
            if !value.starts_with('/') || (value.len() > 1 && value.ends_with('/')) {
                return Err(anyhow::anyhow!(
                    "{} must start with '/' and have no trailing slash",
                    key
                ));
            }
        }

        if self.rpc_transport == RpcTransportKind::Http && self.rpc_http_url.is_none() {
            return Err(anyhow::anyhow!(
                "RPC_HTTP_URL must be set when RPC_TRANSPORT=http"
            ));
        }

        if self.quota.refund_timeout_ms == 0 {
            return Err(anyhow::anyhow!(
                "QUOTA_REFUND_TIMEOUT_MS must be greater than 0"
            ));
        }

        self.routes.validate()
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<GatewayConfig>);

impl From<GatewayConfig> for Config {
    fn from(config: GatewayConfig) -> Self {
        Config(Box::new(config))
    }
}

impl Config {
    fn inner(&self) -> &GatewayConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(GatewayConfig::from_env()?.into())
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().http_concurrency_limit
    }

    pub fn log_format(&self) -> &str {
        &self.inner().log_format
    }

    pub fn files_attach_point(&self) -> &str {
        &self.inner().files_attach_point
    }

    /// Absolute base URL of the files resource, e.g. `https://api.example.com/api/files`.
    pub fn files_base_url(&self) -> String {
        format!("{}{}", self.inner().public_host, self.inner().files_attach_point)
    }

    /// Absolute base URL of the users resource, used for owner links.
    pub fn users_base_url(&self) -> String {
        format!("{}{}", self.inner().public_host, self.inner().users_attach_point)
    }

    pub fn routes(&self) -> &RoutesConfig {
        &self.inner().routes
    }

    pub fn rpc_transport(&self) -> RpcTransportKind {
        self.inner().rpc_transport
    }

    pub fn rpc_http_url(&self) -> Option<&str> {
        self.inner().rpc_http_url.as_deref()
    }

    pub fn preview_codec_url(&self) -> Option<&str> {
        self.inner().preview_codec_url.as_deref()
    }

    pub fn quota(&self) -> &QuotaConfig {
        &self.inner().quota
    }

    pub fn gce(&self) -> Option<&GceConfig> {
        self.inner().gce.as_ref()
    }

    pub fn pubsub_token(&self) -> Option<&str> {
        self.inner().pubsub_token.as_deref()
    }
}
