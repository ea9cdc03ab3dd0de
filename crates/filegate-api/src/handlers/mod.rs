pub mod access;
pub mod document;
pub mod download;
pub mod finish;
pub mod health;
pub mod hooks;
pub mod info;
pub mod list;
pub mod player;
pub mod preview;
pub mod process;
pub mod public;
pub mod remove;
pub mod update;
pub mod upload;

pub use document::{DocumentMeta, ListDocument, ResourceDocument, TypedData, TypedDocument};
