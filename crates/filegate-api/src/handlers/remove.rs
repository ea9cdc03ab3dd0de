use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use filegate_core::Operation;
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct RemoveMessage<'a> {
    filename: &'a str,
    /// Omitted for administrators, who may remove any file.
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

/// Remove a file.
#[utoipa::path(
    delete,
    path = "/api/files/{filename}",
    tag = "files",
    params(("filename" = String, Path, description = "Upload id")),
    responses(
        (status = 200, description = "File removed"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, user), fields(operation = "remove_file", user_id = %user.id))]
pub async fn remove_file(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let message = RemoveMessage {
        filename: &filename,
        username: (!user.is_admin).then_some(user.id.as_str()),
    };
    state.rpc.call_route(Operation::Remove, &message).await?;

    Ok(StatusCode::OK)
}
