use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

pub const FILE_RESOURCE_TYPE: &str = "file";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ResourceLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// JSON:API resource object for a file.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
    pub links: ResourceLinks,
}
