use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use filegate_core::models::{FileMeta, UpdateRequest};
use filegate_core::Operation;
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateMessage<'a> {
    upload_id: &'a str,
    meta: &'a FileMeta,
    username: &'a str,
}

/// Update user-editable metadata of a file. Tags are stored lowercase and trimmed.
#[utoipa::path(
    patch,
    path = "/api/files/update",
    tag = "files",
    request_body = UpdateRequest,
    responses(
        (status = 204, description = "Metadata updated"),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, user, request), fields(operation = "update_file", user_id = %user.id))]
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<UpdateRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let UpdateRequest { data } = request;
    let mut meta = data.attributes.meta;
    meta.normalize_tags();

    state
        .rpc
        .call_route(
            Operation::Update,
            &UpdateMessage {
                upload_id: &data.id,
                meta: &meta,
                username: &user.id,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
