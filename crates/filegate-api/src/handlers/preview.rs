//! Preview images rendered by the codec.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use filegate_core::models::{InfoReply, RequestIdentity};
use filegate_core::preview::parse_preview;
use filegate_core::visibility::ensure_visible;
use filegate_core::{AppError, Operation};

use crate::auth::Identity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::info::InfoRequest;
use crate::state::AppState;

async fn render_preview(
    state: &AppState,
    identity: &RequestIdentity,
    alias: &str,
    modifiers: Option<&str>,
    filename: &str,
) -> Result<Response, HttpAppError> {
    let request = parse_preview(filename, modifiers)?;

    let reply: InfoReply = state
        .rpc
        .call_typed(
            Operation::Info,
            &InfoRequest {
                filename: &request.filename,
                username: alias,
            },
        )
        .await?;

    ensure_visible(identity, &reply.username, &reply.file)?;

    let preview = reply
        .file
        .preview
        .as_deref()
        .ok_or_else(|| AppError::PreconditionFailed("preview was not extracted yet".to_string()))?;

    let stream = state
        .codec
        .render(&request.codec_path(preview), &request.format)
        .await?;

    let cache_control = if reply.file.public {
        "public, max-age=3600"
    } else {
        "private, max-age=3600"
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, request.content_type())
        .header(header::CACHE_CONTROL, cache_control)
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })
}

/// Preview image at its stored size.
#[utoipa::path(
    get,
    path = "/api/files/preview/{alias}/{filename}",
    tag = "previews",
    params(
        ("alias" = String, Path, description = "Owner alias"),
        ("filename" = String, Path, description = "Upload id, optionally with an output format extension")
    ),
    responses(
        (status = 200, description = "Rendered image", content_type = "image/jpeg"),
        (status = 404, description = "File not found or not visible", body = ErrorResponse),
        (status = 412, description = "Preview not extracted yet", body = ErrorResponse),
        (status = 502, description = "Codec failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, identity), fields(operation = "preview"))]
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Identity(identity): Identity,
    Path((alias, filename)): Path<(String, String)>,
) -> Result<Response, HttpAppError> {
    render_preview(&state, &identity, &alias, None, &filename).await
}

/// Preview image with modifiers, e.g. `h200-w200-cfill`.
#[utoipa::path(
    get,
    path = "/api/files/preview/{alias}/{modifiers}/{filename}",
    tag = "previews",
    params(
        ("alias" = String, Path, description = "Owner alias"),
        ("modifiers" = String, Path, description = "Resize/crop modifiers joined by '-'"),
        ("filename" = String, Path, description = "Upload id, optionally with an output format extension")
    ),
    responses(
        (status = 200, description = "Rendered image", content_type = "image/jpeg"),
        (status = 400, description = "Invalid modifiers", body = ErrorResponse),
        (status = 404, description = "File not found or not visible", body = ErrorResponse),
        (status = 412, description = "Preview not extracted yet", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, identity), fields(operation = "preview_with_modifiers"))]
pub async fn preview_with_modifiers(
    State(state): State<Arc<AppState>>,
    Identity(identity): Identity,
    Path((alias, modifiers, filename)): Path<(String, String, String)>,
) -> Result<Response, HttpAppError> {
    render_preview(&state, &identity, &alias, Some(&modifiers), &filename).await
}
