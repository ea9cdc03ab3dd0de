//! Request bodies accepted by the mutation endpoints.
//!
//! Bodies follow the JSON:API shape `{ "data": { ... } }`. Only structural checks live here;
//! ownership and quota rules are enforced by the handlers and the backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

/// User-editable file metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20, message = "At most 20 tags are allowed"))]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<String>>,
    /// Viewer control settings, relayed as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls_data: Option<Vec<f64>>,
    /// Model type, e.g. `object`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "Type must be between 1 and 50 characters"))]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Uploaded image descriptor `{uploadId, filename, url, ...}`, or a plain path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub background_image: Option<Value>,
}

impl FileMeta {
    /// Tags are stored lowercase and trimmed; blank tags are dropped.
    pub fn normalize_tags(&mut self) {
        if let Some(tags) = self.tags.as_mut() {
            *tags = tags
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
        }
    }
}

/// One blob the client intends to upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadPart {
    #[validate(length(min = 1, max = 255, message = "Content type must be between 1 and 255 characters"))]
    pub content_type: String,
    #[validate(range(min = 1, message = "Content length must be at least 1 byte"))]
    pub content_length: u64,
    #[validate(length(equal = 32, message = "md5Hash must be a 32 character hex digest"))]
    pub md5_hash: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Type must be between 1 and 50 characters"))]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decompressed_length: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadAttributes {
    #[validate(
        length(min = 1, max = 20, message = "Between 1 and 20 files per upload"),
        nested
    )]
    pub files: Vec<UploadPart>,
    #[serde(default)]
    #[validate(nested)]
    pub meta: FileMeta,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub resumable: bool,
    #[serde(default)]
    pub temp: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UploadData {
    #[validate(nested)]
    pub attributes: UploadAttributes,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UploadRequest {
    #[validate(nested)]
    pub data: UploadData,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct FinishData {
    /// Storage filename of the completed blob.
    #[validate(length(min = 1, max = 512, message = "id must be between 1 and 512 characters"))]
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct FinishRequest {
    #[validate(nested)]
    pub data: FinishData,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdateAttributes {
    #[validate(nested)]
    pub meta: FileMeta,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdateData {
    #[validate(length(min = 1, max = 128, message = "id must be between 1 and 128 characters"))]
    pub id: String,
    #[validate(nested)]
    pub attributes: UpdateAttributes,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdateRequest {
    #[validate(nested)]
    pub data: UpdateData,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AccessAttributes {
    pub public: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct AccessData {
    #[validate(length(min = 1, max = 128, message = "id must be between 1 and 128 characters"))]
    pub id: String,
    pub attributes: AccessAttributes,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct AccessRequest {
    #[validate(nested)]
    pub data: AccessData,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProcessAttributes {
    /// Export settings forwarded verbatim to the backend.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub export: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ProcessData {
    #[validate(length(min = 1, max = 128, message = "id must be between 1 and 128 characters"))]
    pub id: String,
    #[serde(default)]
    pub attributes: ProcessAttributes,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ProcessRequest {
    #[validate(nested)]
    pub data: ProcessData,
}
