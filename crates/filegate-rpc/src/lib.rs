//! Messaging client for the file backend: route resolution, bounded request/reply
//! calls and the transports that carry them.

pub mod client;
pub mod error;
pub mod registry;
pub mod transport;

pub use client::{RpcClient, RpcTransport};
pub use error::{RemoteCode, RemoteError, RpcError};
pub use registry::{RouteDescriptor, RouteRegistry};
