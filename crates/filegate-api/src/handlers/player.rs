//! Player metadata: the JSON a 3D viewer loads to render a model.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use filegate_core::models::BlobInfo;
use filegate_core::{AppError, Operation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Identity;
use crate::constants::{BLOB_TYPE_BINARY, BLOB_TYPE_TEXTURE, PLAYER_EXTENSION};
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::download::DownloadRequest;
use crate::state::AppState;

/// Subset of the download bundle the player needs. `urls[i]` belongs to `files[i]`.
#[derive(Debug, Deserialize)]
struct DownloadBundle {
    #[serde(default)]
    files: Vec<BlobInfo>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    urls: Vec<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Material {
    pub texture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlayerMeta {
    pub name: Option<String>,
    pub owner: Option<String>,
    pub materials: Vec<Material>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl From<DownloadBundle> for PlayerMeta {
    fn from(bundle: DownloadBundle) -> Self {
        let mut meta = PlayerMeta {
            name: bundle.name,
            owner: bundle.username,
            materials: Vec::new(),
            file: None,
            size: None,
        };

        for (idx, blob) in bundle.files.iter().enumerate() {
            let url = bundle.urls.get(idx).cloned();
            match blob.kind.as_str() {
                BLOB_TYPE_TEXTURE => meta.materials.push(Material { texture: url }),
                BLOB_TYPE_BINARY => {
                    meta.file = url;
                    meta.size = blob
                        .decompressed_length
                        .filter(|len| *len > 0)
                        .or(blob.content_length);
                }
                _ => {}
            }
        }

        meta
    }
}

/// Player metadata for `{uploadId}.json`. Returned as a bare JSON object, not a
/// JSON:API document, since viewers fetch it as a static asset.
#[utoipa::path(
    get,
    path = "/api/files/player/{filename}",
    tag = "files",
    params(("filename" = String, Path, description = "Upload id followed by .json")),
    responses(
        (status = 200, description = "Player metadata", body = PlayerMeta),
        (status = 404, description = "Not a .json request, or file not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, identity), fields(operation = "player_meta"))]
pub async fn player_meta(
    State(state): State<Arc<AppState>>,
    Identity(identity): Identity,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload_id = filename
        .strip_suffix(PLAYER_EXTENSION)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::NotFound(format!("{} does not exist", filename)))?;

    let bundle: DownloadBundle = state
        .rpc
        .call_typed(
            Operation::Download,
            &DownloadRequest {
                upload_id,
                username: identity.id(),
            },
        )
        .await?;

    Ok(Json(PlayerMeta::from(bundle)))
}
