//! Route definitions for the Cumulus HTTP API.
//!
//! OCS share endpoints are mounted twice, under the v1 and v2 OCS
//! prefixes; the WebDAV files tree lives under `/remote.php/dav/files`.

use axum::{
    Extension, Router, middleware as axum_middleware,
    routing::{any, get},
};

use crate::handlers;
use crate::middleware;
use crate::ocs::OcsVersion;
use crate::state::AppState;

/// Prefix of the v1 files_sharing API.
pub const OCS_V1_SHARING: &str = "/ocs/v1.php/apps/files_sharing/api/v1";
/// Prefix of the v2 files_sharing API.
pub const OCS_V2_SHARING: &str = "/ocs/v2.php/apps/files_sharing/api/v1";

/// Build the Axum router with all routes and the request logging
/// middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest(OCS_V1_SHARING, share_routes().layer(Extension(OcsVersion::V1)))
        .nest(OCS_V2_SHARING, share_routes().layer(Extension(OcsVersion::V2)))
        .merge(dav_routes())
        .merge(health_routes())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Share CRUD
fn share_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/shares",
            get(handlers::shares::list_shares).post(handlers::shares::create_share),
        )
        .route(
            "/shares/{id}",
            get(handlers::shares::get_share).delete(handlers::shares::delete_share),
        )
}

/// WebDAV files tree; any method, including PROPFIND and PROPPATCH
fn dav_routes() -> Router<AppState> {
    Router::new()
        .route("/remote.php/dav/files/{user}", any(handlers::dav::dav_root))
        .route("/remote.php/dav/files/{user}/", any(handlers::dav::dav_root))
        .route("/remote.php/dav/files/{user}/{*path}", any(handlers::dav::dav_path))
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
