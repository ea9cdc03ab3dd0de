use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An authenticated caller as forwarded by the upstream auth layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Username; this is what file records store as their owner.
    pub id: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl UserIdentity {
    /// True when `name` is either the caller's id or alias.
    pub fn answers_to(&self, name: &str) -> bool {
        self.id == name || self.alias.as_deref() == Some(name)
    }

    /// Remaining model upload quota, when the users service reported one.
    pub fn remaining_models(&self) -> Option<i64> {
        self.attributes.get("models").and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

/// Who is making the request. Supplied once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestIdentity {
    #[default]
    Anonymous,
    User(UserIdentity),
}

impl RequestIdentity {
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            RequestIdentity::Anonymous => None,
            RequestIdentity::User(user) => Some(user),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.user().map(|u| u.id.as_str())
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, RequestIdentity::User(user) if user.is_admin)
    }
}
