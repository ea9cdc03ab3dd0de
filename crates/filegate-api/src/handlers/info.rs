use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use filegate_core::models::InfoReply;
use filegate_core::visibility::ensure_visible;
use filegate_core::Operation;
use filegate_infra::RequestId;
use serde::Serialize;

use crate::auth::Identity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::document::{DocumentMeta, ResourceDocument};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct InfoRequest<'a> {
    pub filename: &'a str,
    /// Owner alias the file is looked up under.
    pub username: &'a str,
}

/// File details. The owner gets the full record; everybody else gets the public view of
/// public files and a 404 otherwise.
#[utoipa::path(
    get,
    path = "/api/files/info/{alias}/{filename}",
    tag = "files",
    params(
        ("alias" = String, Path, description = "Owner alias"),
        ("filename" = String, Path, description = "Upload id")
    ),
    responses(
        (status = 200, description = "File resource", body = ResourceDocument),
        (status = 404, description = "File not found or not visible", body = ErrorResponse),
        (status = 504, description = "Backend did not reply in time", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, identity), fields(operation = "file_info"))]
pub async fn file_info(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Identity(identity): Identity,
    Path((alias, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let reply: InfoReply = state
        .rpc
        .call_typed(
            Operation::Info,
            &InfoRequest {
                filename: &filename,
                username: &alias,
            },
        )
        .await?;

    let private = ensure_visible(&identity, &reply.username, &reply.file)?;

    Ok(Json(ResourceDocument {
        meta: DocumentMeta::new(&request_id),
        data: state.projector.transform(&reply.file, true, !private),
    }))
}
