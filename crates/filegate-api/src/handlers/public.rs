//! Public file view, no authentication.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use filegate_core::models::{FileRecord, InfoReply};
use filegate_core::{AppError, Operation};
use filegate_infra::RequestId;
use filegate_rpc::RemoteCode;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::document::{DocumentMeta, ResourceDocument};
use crate::state::AppState;

const NOT_FOUND_MESSAGE: &str = "could not find associated data";

#[derive(Debug, Serialize)]
struct GetRequest<'a> {
    filename: &'a str,
    alias: &'a str,
}

/// The backend replies either with the bare record or with an `{username, file}` pair.
fn decode_record(reply: Value) -> Result<FileRecord, AppError> {
    let decoded = if reply.get("file").is_some() {
        serde_json::from_value::<InfoReply>(reply).map(|info| info.file)
    } else {
        serde_json::from_value::<FileRecord>(reply)
    };
    decoded.map_err(|e| AppError::Transport(format!("undecodable get reply: {}", e)))
}

/// Public file details. Non-public files, and files the backend refuses to expose, look
/// exactly like missing ones.
#[utoipa::path(
    get,
    path = "/api/files/public/{alias}/{filename}",
    tag = "files",
    params(
        ("alias" = String, Path, description = "Owner alias"),
        ("filename" = String, Path, description = "Upload id")
    ),
    responses(
        (status = 200, description = "Public file resource", body = ResourceDocument),
        (status = 404, description = "File not found or not public", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "public_file"))]
pub async fn public_file(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Path((alias, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let reply = state
        .rpc
        .call_route(
            Operation::Get,
            &GetRequest {
                filename: &filename,
                alias: &alias,
            },
        )
        .await
        .map_err(|err| match err.remote_code() {
            Some(RemoteCode::Forbidden) => AppError::NotFound(NOT_FOUND_MESSAGE.to_string()),
            _ => AppError::from(err),
        })?;

    let record = decode_record(reply)?;
    if !record.public {
        return Err(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()).into());
    }

    Ok(Json(ResourceDocument {
        meta: DocumentMeta::new(&request_id),
        data: state.projector.transform(&record, true, true),
    }))
}
