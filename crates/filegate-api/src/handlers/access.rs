use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use filegate_core::models::AccessRequest;
use filegate_core::Operation;
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessMessage<'a> {
    filename: &'a str,
    set_public: bool,
    username: &'a str,
}

/// Make a file public or private.
#[utoipa::path(
    put,
    path = "/api/files/access",
    tag = "files",
    request_body = AccessRequest,
    responses(
        (status = 204, description = "Visibility changed"),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, user, request), fields(operation = "set_access", user_id = %user.id))]
pub async fn set_access(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<AccessRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .rpc
        .call_route(
            Operation::Access,
            &AccessMessage {
                filename: &request.data.id,
                set_public: request.data.attributes.public,
                username: &user.id,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
