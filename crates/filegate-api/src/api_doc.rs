//! OpenAPI documentation.
//!
//! Handler paths are annotated under the default `/api/files` attach point.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use filegate_core::models;
use filegate_core::pagination;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Filegate API",
        version = "0.1.0",
        description = "HTTP gateway for the file service: listing, details, downloads, uploads, previews and storage notifications. Every operation is relayed to the file backend over request/reply messaging."
    ),
    paths(
        handlers::list::list_files,
        handlers::upload::upload_file,
        handlers::finish::finish_upload,
        handlers::info::file_info,
        handlers::public::public_file,
        handlers::download::download_file,
        handlers::player::player_meta,
        handlers::update::update_file,
        handlers::access::set_access,
        handlers::process::process_file,
        handlers::remove::remove_file,
        handlers::preview::preview,
        handlers::preview::preview_with_modifiers,
        handlers::hooks::gce_hook,
        handlers::hooks::gce_pubsub_hook,
        handlers::health::health_check,
    ),
    components(
        schemas(
            error::ErrorResponse,
            models::Resource,
            models::ResourceLinks,
            models::FileMeta,
            models::UploadPart,
            models::UploadAttributes,
            models::UploadData,
            models::UploadRequest,
            models::FinishData,
            models::FinishRequest,
            models::UpdateAttributes,
            models::UpdateData,
            models::UpdateRequest,
            models::AccessAttributes,
            models::AccessData,
            models::AccessRequest,
            models::ProcessAttributes,
            models::ProcessData,
            models::ProcessRequest,
            pagination::PageLinks,
            handlers::document::DocumentMeta,
            handlers::document::ResourceDocument,
            handlers::document::ListDocument,
            handlers::document::TypedData,
            handlers::document::TypedLinks,
            handlers::document::TypedDocument,
            handlers::player::PlayerMeta,
            handlers::player::Material,
            handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "files", description = "File listing, details and management"),
        (name = "uploads", description = "Upload initiation and completion"),
        (name = "previews", description = "Rendered preview images"),
        (name = "hooks", description = "Storage change notifications"),
        (name = "health", description = "Health checks")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
