//! Filegate API library
//!
//! HTTP surface of the gateway: router, identity extraction, endpoint handlers and
//! application setup. The binary in `main.rs` is a thin wrapper around [`setup`].

mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
