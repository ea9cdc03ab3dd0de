//! Domain core of the file gateway: configuration, errors, models and the pure
//! request-shaping logic (query normalization, visibility, pagination, projection).

pub mod config;
pub mod error;
pub mod models;
pub mod operation;
pub mod pagination;
pub mod preview;
pub mod projection;
pub mod query;
pub mod visibility;

pub use config::{Config, GatewayConfig, RoutesConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use operation::{Operation, Service};
