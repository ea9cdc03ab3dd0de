use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use filegate_core::models::ProcessRequest;
use filegate_core::Operation;
use serde::Serialize;
use serde_json::Value;

use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessMessage<'a> {
    upload_id: &'a str,
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<&'a Value>,
}

/// Queue (re)processing of an uploaded file, optionally exporting to another format.
#[utoipa::path(
    post,
    path = "/api/files/process",
    tag = "files",
    request_body = ProcessRequest,
    responses(
        (status = 201, description = "Processing scheduled"),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 412, description = "File is not uploaded yet", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, user, request), fields(operation = "process_file", user_id = %user.id))]
pub async fn process_file(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<ProcessRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .rpc
        .call_route(
            Operation::Process,
            &ProcessMessage {
                upload_id: &request.data.id,
                username: &user.id,
                export: request.data.attributes.export.as_ref(),
            },
        )
        .await?;

    Ok(StatusCode::CREATED)
}
