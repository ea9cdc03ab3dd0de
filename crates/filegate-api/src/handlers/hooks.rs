//! Storage change notifications.
//!
//! Two flavors relay "object written" events to the `finish` operation:
//!
//! - `/gce`: object change notification channel, authenticated by the channel headers
//! - `/gce-pubsub`: Pub/Sub push subscription, authenticated by a `token` query parameter
//!
//! Both answer 202 with a short text. A backend that is still processing (202) or waiting
//! for more parts (412) is not an error for the notifier, so those are folded into the text.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use filegate_core::config::GceConfig;
use filegate_core::{AppError, Operation};
use filegate_rpc::{RemoteCode, RpcError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use subtle::ConstantTimeEq;

use crate::constants::{
    GCE_CHANNEL_ID_HEADER, GCE_CHANNEL_TOKEN_HEADER, GCE_RESOURCE_ID_HEADER,
    GCE_RESOURCE_STATE_HEADER, GCE_RESOURCE_URI_HEADER, OBJECT_FINALIZE,
};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

const STATE_SYNC: &str = "sync";
const STATE_NOT_EXISTS: &str = "not_exists";

#[derive(Debug, Serialize)]
struct FinishNotification<'a> {
    filename: &'a str,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Bucket name from a resource URI such as
/// `https://www.googleapis.com/storage/v1/b/{bucket}/o?alt=json`.
fn bucket_from_resource_uri(resource_uri: &str) -> Option<String> {
    let uri: Uri = resource_uri.parse().ok()?;
    uri.path()
        .split('/')
        .nth(4)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Check the notification channel headers, in order, against the configured secrets.
fn verify_channel(headers: &HeaderMap, gce: &GceConfig) -> Result<(), AppError> {
    if !secure_compare(header(headers, GCE_CHANNEL_ID_HEADER), &gce.channel) {
        return Err(AppError::Forbidden("invalid channel".to_string()));
    }
    if !secure_compare(header(headers, GCE_RESOURCE_ID_HEADER), &gce.resource_id) {
        return Err(AppError::Forbidden("invalid resource id".to_string()));
    }
    if !secure_compare(header(headers, GCE_CHANNEL_TOKEN_HEADER), &gce.token) {
        return Err(AppError::Forbidden("invalid token".to_string()));
    }
    let bucket = bucket_from_resource_uri(header(headers, GCE_RESOURCE_URI_HEADER));
    if bucket.as_deref() != Some(gce.bucket.as_str()) {
        return Err(AppError::Forbidden("invalid bucket".to_string()));
    }
    Ok(())
}

/// Fold the `finish` outcome into the notifier-facing text.
fn fold_finish_result(result: Result<Value, RpcError>) -> Result<String, AppError> {
    match result {
        Ok(_) => Ok("OK".to_string()),
        Err(RpcError::Remote(err)) => match err.kind() {
            RemoteCode::Accepted => Ok(format!("202: {}", err.message)),
            RemoteCode::PreconditionFailed => Ok(format!("412: {}", err.message)),
            _ => Err(RpcError::Remote(err).into()),
        },
        Err(err) => Err(err.into()),
    }
}

async fn relay_finish(state: &AppState, filename: &str) -> Result<Response, HttpAppError> {
    tracing::info!(filename = %filename, "Relaying storage notification");
    let result = state
        .rpc
        .call_route(Operation::Finish, &FinishNotification { filename })
        .await;
    let text = fold_finish_result(result)?;
    Ok((StatusCode::ACCEPTED, Json(text)).into_response())
}

#[derive(Debug, Deserialize)]
struct ObjectResource {
    name: String,
}

/// Object change notification.
#[utoipa::path(
    post,
    path = "/api/files/gce",
    tag = "hooks",
    request_body(content = Object, content_type = "application/json", description = "Object resource; only `name` is read"),
    responses(
        (status = 200, description = "Sync or delete notification acknowledged"),
        (status = 202, description = "Finish relayed; body is OK or a folded backend message", body = String),
        (status = 403, description = "Channel verification failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, body), fields(operation = "gce_hook"))]
pub async fn gce_hook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpAppError> {
    let gce = state
        .config
        .gce()
        .ok_or_else(|| AppError::Forbidden("notification channel is not configured".to_string()))?;
    verify_channel(&headers, gce)?;

    let resource_state = header(&headers, GCE_RESOURCE_STATE_HEADER);
    if resource_state == STATE_SYNC || resource_state == STATE_NOT_EXISTS {
        tracing::debug!(resource_state = %resource_state, "Notification acknowledged without relay");
        return Ok(StatusCode::OK.into_response());
    }

    let object: ObjectResource = serde_json::from_slice(&body)
        .map_err(|e| AppError::validation("name", format!("object resource is malformed: {}", e)))?;

    relay_finish(&state, &object.name).await
}

#[derive(Debug, Deserialize)]
pub struct PushQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PushEnvelope {
    message: PushMessage,
}

#[derive(Debug, Deserialize)]
struct PushMessage {
    #[serde(default)]
    attributes: PushAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushAttributes {
    event_type: Option<String>,
    bucket_id: Option<String>,
    object_id: Option<String>,
}

/// Pub/Sub push notification.
#[utoipa::path(
    post,
    path = "/api/files/gce-pubsub",
    tag = "hooks",
    request_body(content = Object, content_type = "application/json", description = "Pub/Sub push envelope"),
    params(("token" = String, Query, description = "Push subscription token")),
    responses(
        (status = 200, description = "Event ignored"),
        (status = 202, description = "Finish relayed; body is OK or a folded backend message", body = String),
        (status = 403, description = "Invalid token", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query, body), fields(operation = "gce_pubsub_hook"))]
pub async fn gce_pubsub_hook(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PushQuery>,
    body: Bytes,
) -> Result<Response, HttpAppError> {
    let expected = state
        .config
        .pubsub_token()
        .ok_or_else(|| AppError::Forbidden("push subscription is not configured".to_string()))?;
    let token = query.token.unwrap_or_default();
    if !secure_compare(&token, expected) {
        return Err(AppError::Forbidden("invalid token".to_string()).into());
    }

    let envelope: PushEnvelope = serde_json::from_slice(&body)
        .map_err(|e| AppError::validation("message", format!("push envelope is malformed: {}", e)))?;
    let attributes = envelope.message.attributes;

    if attributes.event_type.as_deref() != Some(OBJECT_FINALIZE) {
        tracing::debug!(event_type = ?attributes.event_type, "Ignoring storage event");
        return Ok(StatusCode::OK.into_response());
    }
    if let Some(gce) = state.config.gce() {
        if attributes.bucket_id.as_deref() != Some(gce.bucket.as_str()) {
            tracing::debug!(bucket = ?attributes.bucket_id, "Ignoring event from foreign bucket");
            return Ok(StatusCode::OK.into_response());
        }
    }

    let object_id = attributes
        .object_id
        .ok_or_else(|| AppError::validation("objectId", "missing object id"))?;

    relay_finish(&state, &object_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use filegate_rpc::RemoteError;
    use serde_json::json;

    fn gce() -> GceConfig {
        GceConfig {
            channel: "chan".to_string(),
            resource_id: "res".to_string(),
            token: "secret".to_string(),
            bucket: "models".to_string(),
        }
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn valid_headers() -> Vec<(&'static str, &'static str)> {
        vec![
            (GCE_CHANNEL_ID_HEADER, "chan"),
            (GCE_RESOURCE_ID_HEADER, "res"),
            (GCE_CHANNEL_TOKEN_HEADER, "secret"),
            (
                GCE_RESOURCE_URI_HEADER,
                "https://www.googleapis.com/storage/v1/b/models/o?alt=json",
            ),
        ]
    }

    #[test]
    fn bucket_is_fifth_path_segment() {
        assert_eq!(
            bucket_from_resource_uri("https://www.googleapis.com/storage/v1/b/models/o?alt=json")
                .as_deref(),
            Some("models")
        );
        assert_eq!(bucket_from_resource_uri("https://example.com/short"), None);
    }

    #[test]
    fn channel_checks_run_in_order() {
        assert!(verify_channel(&headers(&valid_headers()), &gce()).is_ok());

        let mut wrong = valid_headers();
        wrong[0].1 = "other";
        wrong[2].1 = "also-wrong";
        let err = verify_channel(&headers(&wrong), &gce()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "invalid channel"));

        let mut wrong = valid_headers();
        wrong[3].1 = "https://www.googleapis.com/storage/v1/b/other/o";
        let err = verify_channel(&headers(&wrong), &gce()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "invalid bucket"));
    }

    #[test]
    fn folds_processing_codes() {
        assert_eq!(fold_finish_result(Ok(json!({}))).unwrap(), "OK");
        assert_eq!(
            fold_finish_result(Err(RpcError::Remote(RemoteError::new(202, "processing")))).unwrap(),
            "202: processing"
        );
        assert_eq!(
            fold_finish_result(Err(RpcError::Remote(RemoteError::new(412, "parts missing")))).unwrap(),
            "412: parts missing"
        );
        assert!(matches!(
            fold_finish_result(Err(RpcError::Remote(RemoteError::new(404, "gone")))),
            Err(AppError::NotFound(_))
        ));
    }
}
