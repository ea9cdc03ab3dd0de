//! Forwarded identities for test requests.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use filegate_api::constants::AUTH_USER_HEADER;
use serde_json::{json, Value};

pub const HEADER: &str = AUTH_USER_HEADER;

/// Encode an identity the way the upstream auth layer does.
pub fn encode(identity: Value) -> String {
    STANDARD.encode(identity.to_string())
}

pub fn user(id: &str, alias: Option<&str>) -> String {
    encode(json!({"id": id, "alias": alias, "isAdmin": false, "attributes": {}}))
}

pub fn admin(id: &str) -> String {
    encode(json!({"id": id, "isAdmin": true}))
}

pub fn user_with_models(id: &str, models: i64) -> String {
    encode(json!({"id": id, "attributes": {"models": models}}))
}
