//! WebDAV files tree: every method is handed to the DAV handler.

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};

use cumulus_webdav::handler::error_response;

use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// ANY /remote.php/dav/files/{user}
pub async fn dav_root(
    State(state): State<AppState>,
    user: Result<CurrentUser, ApiError>,
    Path(owner): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    serve(&state, user, &owner, "", &method, &headers, &body).await
}

/// ANY /remote.php/dav/files/{user}/{*path}
pub async fn dav_path(
    State(state): State<AppState>,
    user: Result<CurrentUser, ApiError>,
    Path((owner, path)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    serve(&state, user, &owner, &path, &method, &headers, &body).await
}

async fn serve(
    state: &AppState,
    user: Result<CurrentUser, ApiError>,
    owner: &str,
    path: &str,
    method: &Method,
    headers: &HeaderMap,
    body: &[u8],
) -> Response {
    let response = match user {
        Ok(user) => {
            state
                .dav
                .handle(user.uid(), owner, path, method, headers, body)
                .await
        }
        Err(ApiError(e)) => error_response(&e),
    };
    response.map(Body::from).into_response()
}
