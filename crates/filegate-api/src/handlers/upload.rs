//! Upload initiation.
//!
//! One model slot is reserved on the users service before the upload is relayed. If
//! the files service refuses the upload for lack of quota, the slot is handed back.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use filegate_core::models::{UploadAttributes, UploadRequest};
use filegate_core::{AppError, Operation};
use filegate_infra::RequestId;
use filegate_rpc::{RemoteCode, RpcError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::document::TypedDocument;
use crate::state::AppState;

pub const UPLOAD_RESOURCE_TYPE: &str = "upload";

const NO_MODELS_LEFT: &str = "no more models are available";

#[derive(Debug, Serialize)]
struct UploadMessage<'a> {
    #[serde(flatten)]
    attributes: &'a UploadAttributes,
    id: &'a str,
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadReply {
    upload_id: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Start an upload. Consumes one model from the caller's quota.
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "uploads",
    request_body = UploadRequest,
    responses(
        (status = 201, description = "Upload created", body = TypedDocument),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 402, description = "No models left in the caller's quota", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, user, headers, request), fields(operation = "upload_file", user_id = %user.id))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    AuthenticatedUser(user): AuthenticatedUser,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<UploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    // Known-empty quota fails before any backend call.
    if user.remaining_models().is_some_and(|models| models < 1) {
        return Err(AppError::PaymentRequired(NO_MODELS_LEFT.to_string()).into());
    }

    state.quota.reserve(&user.id).await?;

    let mut attributes = request.data.attributes;
    attributes.meta.normalize_tags();
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());

    let message = UploadMessage {
        attributes: &attributes,
        id: &user.id,
        username: &user.id,
        origin,
    };

    let reply: UploadReply = match state.rpc.call_typed(Operation::Upload, &message).await {
        Ok(reply) => reply,
        Err(RpcError::Remote(err)) if err.kind() == RemoteCode::PaymentRequired => {
            state.quota.refund(&user.id, "upload refused for quota").await;
            return Err(AppError::PaymentRequired(err.message).into());
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(upload_id = %reply.upload_id, "Upload created");

    let location = reply
        .location
        .unwrap_or_else(|| format!("{}/{}", state.files_base_url(), reply.upload_id));
    let document = TypedDocument::new(&request_id, UPLOAD_RESOURCE_TYPE, reply.upload_id, reply.rest)
        .with_self_link(location);

    Ok((StatusCode::CREATED, Json(document)))
}
