//! JSON:API response documents.
//!
//! Every JSON response carries `meta.id`, the request id, so a client can quote it when
//! reporting a problem.

use filegate_core::models::{PageInfo, Resource};
use filegate_core::pagination::PageLinks;
use filegate_infra::RequestId;
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentMeta {
    /// Request id, as echoed in `X-Request-ID`
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<u64>,
}

impl DocumentMeta {
    pub fn new(request_id: &RequestId) -> Self {
        Self {
            id: request_id.as_str().to_string(),
            page: None,
            pages: None,
            cursor: None,
        }
    }

    /// Meta of a list page; pagination fields are copied from the backend reply verbatim.
    pub fn with_page(request_id: &RequestId, info: &PageInfo) -> Self {
        Self {
            page: Some(info.page),
            pages: Some(info.pages),
            cursor: info.cursor,
            ..Self::new(request_id)
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResourceDocument {
    pub meta: DocumentMeta,
    pub data: Resource,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListDocument {
    pub meta: DocumentMeta,
    pub data: Vec<Resource>,
    pub links: PageLinks,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TypedLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Resource object for non-file types (`upload`, `download`).
#[derive(Debug, Serialize, ToSchema)]
pub struct TypedData {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<TypedLinks>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TypedDocument {
    pub meta: DocumentMeta,
    pub data: TypedData,
}

impl TypedDocument {
    pub fn new(request_id: &RequestId, kind: &str, id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            meta: DocumentMeta::new(request_id),
            data: TypedData {
                kind: kind.to_string(),
                id: id.into(),
                attributes,
                links: None,
            },
        }
    }

    pub fn with_self_link(mut self, link: impl Into<String>) -> Self {
        self.data.links = Some(TypedLinks {
            self_link: link.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_meta_carries_pagination() {
        let request_id = RequestId("req-1".to_string());
        let meta = DocumentMeta::with_page(&request_id, &PageInfo { page: 2, pages: 5, cursor: Some(20) });
        assert_eq!(
            serde_json::to_value(meta).unwrap(),
            json!({"id": "req-1", "page": 2, "pages": 5, "cursor": 20})
        );
    }

    #[test]
    fn list_meta_omits_missing_cursor() {
        let request_id = RequestId("req-3".to_string());
        let meta = DocumentMeta::with_page(&request_id, &PageInfo { page: 1, pages: 1, cursor: None });
        assert_eq!(
            serde_json::to_value(meta).unwrap(),
            json!({"id": "req-3", "page": 1, "pages": 1})
        );
    }

    #[test]
    fn typed_document_omits_empty_parts() {
        let request_id = RequestId("req-2".to_string());
        let doc = TypedDocument::new(&request_id, "upload", "u1", Map::new());
        let value = serde_json::to_value(doc).unwrap();
        assert_eq!(value["data"], json!({"type": "upload", "id": "u1"}));
    }
}
