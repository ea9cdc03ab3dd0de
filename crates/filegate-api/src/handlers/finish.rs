use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use filegate_core::models::FinishRequest;
use filegate_core::{AppError, Operation};
use filegate_rpc::{RemoteCode, RpcError};
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct FinishMessage<'a> {
    id: &'a str,
    username: &'a str,
}

#[derive(Debug, Deserialize)]
struct FinishReply {
    filename: String,
}

/// Mark a resumable upload part as complete.
///
/// Answers 202 with `Location` pointing at the file. When the backend says the upload is
/// still being processed, the 202 carries its message instead.
#[utoipa::path(
    post,
    path = "/api/files/finish",
    tag = "uploads",
    request_body = FinishRequest,
    responses(
        (status = 202, description = "Upload finished; Location points at the file"),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 412, description = "Upload is not complete yet", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, user, request), fields(operation = "finish_upload", user_id = %user.id))]
pub async fn finish_upload(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<FinishRequest>,
) -> Result<Response, HttpAppError> {
    let message = FinishMessage {
        id: &request.data.id,
        username: &user.id,
    };

    match state.rpc.call_typed::<_, FinishReply>(Operation::Finish, &message).await {
        Ok(reply) => {
            let location = format!("{}/{}", state.files_base_url(), reply.filename);
            Response::builder()
                .status(StatusCode::ACCEPTED)
                .header(header::LOCATION, location)
                .body(axum::body::Body::empty())
                .map_err(|e| HttpAppError(AppError::Internal(e.to_string())))
        }
        Err(RpcError::Remote(err)) if err.kind() == RemoteCode::Accepted => {
            tracing::debug!(message = %err.message, "Upload still processing");
            Ok((StatusCode::ACCEPTED, Json(format!("202: {}", err.message))).into_response())
        }
        Err(err) => Err(err.into()),
    }
}
