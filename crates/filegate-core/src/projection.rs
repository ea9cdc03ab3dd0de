//! Converts backend file records into JSON:API resources.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::{Map, Value};

use crate::models::{FileRecord, Resource, ResourceLinks, FILE_RESOURCE_TYPE};

/// Path-segment encoding; `/` is escaped so an owner or id stays a single segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Top-level record fields only the owner may see.
const PRIVATE_FIELDS: &[&str] = &["error", "preview", "model", "location", "bucket", "resumableUri"];
const PRIVATE_FIELD_PREFIX: &str = "texture_";
/// Per-blob fields only the owner may see.
const PRIVATE_BLOB_FIELDS: &[&str] = &["filename"];

fn segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Builds file resources with links rooted at the public files and users URLs.
#[derive(Debug, Clone)]
pub struct ResourceProjector {
    files_base_url: String,
    users_base_url: String,
}

impl ResourceProjector {
    pub fn new(files_base_url: impl Into<String>, users_base_url: impl Into<String>) -> Self {
        Self {
            files_base_url: files_base_url.into(),
            users_base_url: users_base_url.into(),
        }
    }

    pub fn files_base_url(&self) -> &str {
        &self.files_base_url
    }

    /// Project `record` into a resource.
    ///
    /// With `redact_private` set, owner-only fields are stripped. With `include_links`
    /// set, `links.owner` points at the owner's user resource when an owner is known.
    pub fn transform(&self, record: &FileRecord, include_links: bool, redact_private: bool) -> Resource {
        let mut attributes = match serde_json::to_value(record) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        attributes.remove("uploadId");

        if !record.public {
            attributes.remove("public");
        }

        if redact_private {
            redact(&mut attributes);
        }

        let self_link = match &record.owner {
            Some(owner) => format!(
                "{}/{}/{}",
                self.files_base_url,
                segment(owner),
                segment(&record.upload_id)
            ),
            None => format!("{}/{}", self.files_base_url, segment(&record.upload_id)),
        };

        let owner = record
            .owner
            .as_ref()
            .filter(|_| include_links)
            .map(|owner| format!("{}/{}", self.users_base_url, segment(owner)));

        Resource {
            kind: FILE_RESOURCE_TYPE.to_string(),
            id: record.upload_id.clone(),
            attributes,
            links: ResourceLinks { self_link, owner },
        }
    }
}

fn redact(attributes: &mut Map<String, Value>) {
    attributes.retain(|key, _| {
        !PRIVATE_FIELDS.contains(&key.as_str()) && !key.starts_with(PRIVATE_FIELD_PREFIX)
    });

    if let Some(Value::Array(files)) = attributes.get_mut("files") {
        for blob in files.iter_mut() {
            if let Value::Object(blob) = blob {
                blob.retain(|key, _| !PRIVATE_BLOB_FIELDS.contains(&key.as_str()));
            }
        }
    }
}
