//! Route configuration and setup

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use filegate_core::Config;
use filegate_infra::request_id_middleware;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::identity_middleware;
use crate::constants::OPENAPI_PATH;
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let files = file_routes().merge(hook_routes());
    let attach_point = config.files_attach_point();
    let mounted = if attach_point == "/" {
        Router::new().merge(files)
    } else {
        Router::new().nest(attach_point, files)
    };

    let http_concurrency_limit = config.http_concurrency_limit();
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let app = mounted
        .merge(public_routes())
        .with_state(state)
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware));

    Ok(app)
}

/// File routes; the caller's identity is decoded once for all of them.
fn file_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::list::list_files).post(handlers::upload::upload_file),
        )
        .route("/finish", post(handlers::finish::finish_upload))
        .route("/info/{alias}/{filename}", get(handlers::info::file_info))
        .route("/public/{alias}/{filename}", get(handlers::public::public_file))
        .route("/download/{filename}", get(handlers::download::download_file))
        .route("/player/{filename}", get(handlers::player::player_meta))
        .route("/update", patch(handlers::update::update_file))
        .route("/access", put(handlers::access::set_access))
        .route("/process", post(handlers::process::process_file))
        .route("/{filename}", delete(handlers::remove::remove_file))
        .route("/preview/{alias}/{filename}", get(handlers::preview::preview))
        .route(
            "/preview/{alias}/{modifiers}/{filename}",
            get(handlers::preview::preview_with_modifiers),
        )
        .layer(axum::middleware::from_fn(identity_middleware))
}

/// Storage notifications authenticate with their own shared secrets.
fn hook_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/gce", post(handlers::hooks::gce_hook))
        .route("/gce-pubsub", post(handlers::hooks::gce_pubsub_hook))
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            OPENAPI_PATH,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
