//! File listing.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
    Json,
};
use filegate_core::models::Page;
use filegate_core::pagination::build_links;
use filegate_core::query::{normalize, RawListParams};
use filegate_core::visibility::{lists_unredacted, resolve_list_scope, scoped_list_query};
use filegate_core::Operation;
use filegate_infra::RequestId;

use crate::auth::Identity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::document::{DocumentMeta, ListDocument};
use crate::state::AppState;

/// List files visible to the caller.
///
/// Anonymous callers and callers looking at someone else's files only see public files.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(RawListParams),
    responses(
        (status = 200, description = "Page of files", body = ListDocument),
        (status = 400, description = "Invalid query parameter", body = ErrorResponse),
        (status = 401, description = "Malformed identity", body = ErrorResponse),
        (status = 504, description = "Backend did not reply in time", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, identity, raw), fields(operation = "list_files"))]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Identity(identity): Identity,
    raw: Result<Query<RawListParams>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(raw) = raw?;
    let params = normalize(&raw)?;

    let scope = resolve_list_scope(
        &identity,
        params.requested_owner.as_deref(),
        params.requested_public,
    );
    tracing::debug!(
        rule = ?scope.rule,
        owner = ?scope.owner,
        public = ?scope.public,
        "Resolved list scope"
    );

    let query = scoped_list_query(params, scope);
    let page: Page = state.rpc.call_typed(Operation::List, &query).await?;

    let links = build_links(state.files_base_url(), &query, &page.info);
    let data = page
        .files
        .iter()
        .map(|record| {
            state
                .projector
                .transform(record, true, !lists_unredacted(&identity, record))
        })
        .collect();

    Ok(Json(ListDocument {
        meta: DocumentMeta::with_page(&request_id, &page.info),
        data,
        links,
    }))
}
