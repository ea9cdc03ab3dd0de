//! HTTP-level constants shared by the router, handlers and tests.

/// Header carrying the identity verified by the upstream auth layer (base64 JSON).
pub const AUTH_USER_HEADER: &str = "X-Auth-User";

/// Path of the served OpenAPI document.
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Player metadata files are requested as `{uploadId}.json`.
pub const PLAYER_EXTENSION: &str = ".json";

/// Blob type tags inside a file bundle.
pub const BLOB_TYPE_BINARY: &str = "c-bin";
pub const BLOB_TYPE_TEXTURE: &str = "c-texture";

pub const GCE_CHANNEL_ID_HEADER: &str = "x-goog-channel-id";
pub const GCE_RESOURCE_ID_HEADER: &str = "x-goog-resource-id";
pub const GCE_CHANNEL_TOKEN_HEADER: &str = "x-goog-channel-token";
pub const GCE_RESOURCE_URI_HEADER: &str = "x-goog-resource-uri";
pub const GCE_RESOURCE_STATE_HEADER: &str = "x-goog-resource-state";

/// Pub/Sub event type emitted when an object upload completes.
pub const OBJECT_FINALIZE: &str = "OBJECT_FINALIZE";

/// Headers describing the object behind a signed-URL redirect.
pub const CONTENT_LENGTH_HINT_HEADER: &str = "X-Content-Length";
pub const CONTENT_TYPE_HINT_HEADER: &str = "X-Content-Type";
