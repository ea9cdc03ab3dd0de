//! File download.
//!
//! The download operation replies in one of three shapes: a signed URL string, an
//! `{url, contentLength?, contentType?}` object, or the full bundle keyed by `uploadId`.
//! URLs become redirects; the bundle is returned as a `download` resource.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use filegate_core::{AppError, Operation};
use filegate_infra::RequestId;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::auth::Identity;
use crate::constants::{CONTENT_LENGTH_HINT_HEADER, CONTENT_TYPE_HINT_HEADER};
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::document::TypedDocument;
use crate::state::AppState;

pub const DOWNLOAD_RESOURCE_TYPE: &str = "download";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DownloadRequest<'a> {
    pub upload_id: &'a str,
    /// Only sent for authenticated callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DownloadReply {
    Redirect {
        url: String,
        content_length: Option<u64>,
        content_type: Option<String>,
    },
    Bundle {
        upload_id: String,
        attributes: Map<String, Value>,
    },
}

fn length_hint(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn classify_reply(reply: Value) -> Result<DownloadReply, AppError> {
    match reply {
        Value::String(url) => Ok(DownloadReply::Redirect {
            url,
            content_length: None,
            content_type: None,
        }),
        Value::Object(mut object) => {
            if let Some(Value::String(upload_id)) = object.remove("uploadId") {
                return Ok(DownloadReply::Bundle {
                    upload_id,
                    attributes: object,
                });
            }
            match object.get("url") {
                Some(Value::String(url)) => Ok(DownloadReply::Redirect {
                    url: url.clone(),
                    content_length: object.get("contentLength").and_then(length_hint),
                    content_type: object
                        .get("contentType")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                }),
                _ => Err(AppError::Transport(
                    "download reply has neither uploadId nor url".to_string(),
                )),
            }
        }
        _ => Err(AppError::Transport("unexpected download reply".to_string())),
    }
}

fn redirect(
    url: &str,
    content_length: Option<u64>,
    content_type: Option<&str>,
) -> Result<Response, AppError> {
    let mut builder = Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, url);
    if let Some(length) = content_length {
        builder = builder.header(CONTENT_LENGTH_HINT_HEADER, length);
    }
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE_HINT_HEADER, content_type);
    }
    builder.body(Body::empty()).map_err(|e| {
        tracing::error!(error = %e, "Failed to build redirect response");
        AppError::Internal(e.to_string())
    })
}

/// Download a file: a redirect to a signed URL, or the file bundle with per-blob URLs.
#[utoipa::path(
    get,
    path = "/api/files/download/{filename}",
    tag = "files",
    params(("filename" = String, Path, description = "Upload id")),
    responses(
        (status = 200, description = "Download bundle", body = TypedDocument),
        (status = 302, description = "Redirect to a signed URL"),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 412, description = "File is not ready for download", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, identity), fields(operation = "download_file"))]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Identity(identity): Identity,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    let reply = state
        .rpc
        .call_route(
            Operation::Download,
            &DownloadRequest {
                upload_id: &filename,
                username: identity.id(),
            },
        )
        .await?;

    match classify_reply(reply)? {
        DownloadReply::Redirect {
            url,
            content_length,
            content_type,
        } => Ok(redirect(&url, content_length, content_type.as_deref())?),
        DownloadReply::Bundle {
            upload_id,
            attributes,
        } => Ok(Json(TypedDocument::new(
            &request_id,
            DOWNLOAD_RESOURCE_TYPE,
            upload_id,
            attributes,
        ))
        .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_reply_redirects() {
        let reply = classify_reply(json!("https://storage.example.com/signed")).unwrap();
        assert!(matches!(reply, DownloadReply::Redirect { ref url, .. } if url == "https://storage.example.com/signed"));
    }

    #[test]
    fn url_object_carries_hints() {
        let reply = classify_reply(json!({
            "url": "https://storage.example.com/signed",
            "contentLength": 1024,
            "contentType": "application/octet-stream"
        }))
        .unwrap();
        assert_eq!(
            reply,
            DownloadReply::Redirect {
                url: "https://storage.example.com/signed".to_string(),
                content_length: Some(1024),
                content_type: Some("application/octet-stream".to_string()),
            }
        );
    }

    #[test]
    fn string_length_hint_is_parsed() {
        let reply = classify_reply(json!({"url": "https://s/x", "contentLength": "2048"})).unwrap();
        assert!(matches!(reply, DownloadReply::Redirect { content_length: Some(2048), .. }));
    }

    #[test]
    fn bundle_splits_off_upload_id() {
        let reply = classify_reply(json!({"uploadId": "u1", "urls": ["a"], "files": []})).unwrap();
        match reply {
            DownloadReply::Bundle { upload_id, attributes } => {
                assert_eq!(upload_id, "u1");
                assert!(!attributes.contains_key("uploadId"));
                assert_eq!(attributes["urls"], json!(["a"]));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn other_shapes_are_rejected() {
        assert!(classify_reply(json!(42)).is_err());
        assert!(classify_reply(json!({"files": []})).is_err());
    }

    #[test]
    fn request_omits_anonymous_username() {
        let body = serde_json::to_value(DownloadRequest { upload_id: "u1", username: None }).unwrap();
        assert_eq!(body, json!({"uploadId": "u1"}));
    }
}
