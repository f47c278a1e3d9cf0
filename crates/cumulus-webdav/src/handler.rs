//! WebDAV request handler: dispatches methods on a user's files.

use std::sync::Arc;

use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, Method, Response, StatusCode};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tracing::{debug, info};

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_database::repositories::PropertyRepository;
use cumulus_entity::share::Permissions;
use cumulus_service::files::{NodeResolver, ResolvedNode, normalize_path};

use crate::backend::{CustomPropertiesBackend, is_ignored};
use crate::properties::{
    DAV_NS, DavResponse, Depth, OC_NS, PropValue, build_error_xml, build_multistatus_xml, clark,
};
use crate::request::{PropfindRequest, parse_propfind, parse_proppatch};

/// Mount point of the files tree.
pub const DAV_FILES_ROOT: &str = "/remote.php/dav/files";

const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const XML: &str = "application/xml; charset=utf-8";

/// Handles DAV requests for the files of the requesting user.
#[derive(Debug, Clone)]
pub struct DavHandler {
    resolver: NodeResolver,
    properties: Arc<PropertyRepository>,
}

impl DavHandler {
    /// Create a new DAV handler.
    pub fn new(resolver: NodeResolver, properties: Arc<PropertyRepository>) -> Self {
        Self {
            resolver,
            properties,
        }
    }

    /// Handle a request on `/remote.php/dav/files/{owner}/{path}` made by
    /// `user`. `path` is already percent-decoded.
    pub async fn handle(
        &self,
        user: &str,
        owner: &str,
        path: &str,
        method: &Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Response<String> {
        let result = if user != owner {
            Err(AppError::authorization("Access to another user's files is not allowed"))
        } else {
            match normalize_path(path) {
                Ok(path) => self.dispatch(user, &path, method, headers, body).await,
                Err(e) => Err(e),
            }
        };

        match result {
            Ok(response) => response,
            Err(e) => error_response(&e),
        }
    }

    async fn dispatch(
        &self,
        user: &str,
        path: &str,
        method: &Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> AppResult<Response<String>> {
        let body = std::str::from_utf8(body)
            .map_err(|_| AppError::validation("Request body is not valid UTF-8"))?;
        debug!(method = %method, user = %user, path = %path, "DAV request");

        match method.as_str() {
            "OPTIONS" => Ok(self.handle_options()),
            "PROPFIND" => {
                let depth = Depth::from_header(header(headers, "Depth"));
                self.handle_propfind(user, path, depth, body).await
            }
            "PROPPATCH" => self.handle_proppatch(user, path, body).await,
            "DELETE" => self.handle_delete(user, path).await,
            "MOVE" => {
                let destination = header(headers, "Destination")
                    .ok_or_else(|| AppError::validation("Missing Destination header"))?;
                self.handle_move(user, path, destination).await
            }
            _ => {
                let mut response = respond(StatusCode::METHOD_NOT_ALLOWED, None, String::new());
                response.headers_mut().insert(
                    http::header::ALLOW,
                    HeaderValue::from_static("OPTIONS, PROPFIND, PROPPATCH, DELETE, MOVE"),
                );
                Ok(response)
            }
        }
    }

    fn handle_options(&self) -> Response<String> {
        let mut response = respond(StatusCode::OK, None, String::new());
        let headers = response.headers_mut();
        headers.insert(
            http::header::ALLOW,
            HeaderValue::from_static("OPTIONS, PROPFIND, PROPPATCH, DELETE, MOVE"),
        );
        headers.insert("DAV", HeaderValue::from_static("1"));
        response
    }

    async fn resolve(&self, user: &str, path: &str) -> AppResult<ResolvedNode> {
        self.resolver
            .get(user, path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: /{path}")))
    }

    async fn handle_propfind(
        &self,
        user: &str,
        path: &str,
        depth: Depth,
        body: &str,
    ) -> AppResult<Response<String>> {
        let request = parse_propfind(body)?;
        let target = self.resolve(user, path).await?;
        let mut backend = CustomPropertiesBackend::new(self.properties.clone(), user);

        let mut entries = vec![(path.to_string(), target.clone())];
        if depth == Depth::One {
            for child in self.resolver.children(&target).await? {
                let child_path = join(path, &child.node.name);
                entries.push((child_path, child));
            }
        }

        let mut responses = Vec::with_capacity(entries.len());
        for (entry_path, node) in &entries {
            let mut response = DavResponse::new(href(user, entry_path, node.node.is_folder));
            let live = live_properties(node);

            match &request {
                PropfindRequest::AllProp => {
                    response.found = live;
                    for (name, value) in backend.all_properties(entry_path).await? {
                        response.found.push((name, PropValue::Text(value)));
                    }
                }
                PropfindRequest::PropName => {
                    let stored = backend.all_properties(entry_path).await?;
                    response.found = live
                        .into_iter()
                        .map(|(name, _)| name)
                        .chain(stored.into_iter().map(|(name, _)| name))
                        .map(|name| (name, PropValue::Text(String::new())))
                        .collect();
                }
                PropfindRequest::Prop(names) => {
                    let mut remaining = Vec::new();
                    for name in names {
                        match live.iter().find(|(live_name, _)| live_name == name) {
                            Some(found) => response.found.push(found.clone()),
                            None => remaining.push(name.clone()),
                        }
                    }
                    let stored = backend.prop_find(entry_path, &remaining).await?;
                    for name in remaining {
                        match stored.iter().find(|(stored_name, _)| *stored_name == name) {
                            Some((_, value)) => {
                                response.found.push((name, PropValue::Text(value.clone())))
                            }
                            None => response.not_found.push(name),
                        }
                    }
                }
            }
            responses.push(response);
        }

        Ok(respond(
            StatusCode::MULTI_STATUS,
            Some(XML),
            build_multistatus_xml(&responses),
        ))
    }

    async fn handle_proppatch(&self, user: &str, path: &str, body: &str) -> AppResult<Response<String>> {
        let changes = parse_proppatch(body)?;
        let target = self.resolve(user, path).await?;
        let live = live_properties(&target);

        let mut response = DavResponse::new(href(user, path, target.node.is_folder));
        let protected: Vec<String> = changes
            .iter()
            .filter(|c| is_ignored(&c.name) || live.iter().any(|(name, _)| *name == c.name))
            .map(|c| c.name.clone())
            .collect();

        if protected.is_empty() {
            let mut backend = CustomPropertiesBackend::new(self.properties.clone(), user);
            backend.prop_patch(path, &changes).await?;
            response.found = changes
                .into_iter()
                .map(|c| (c.name, PropValue::Text(String::new())))
                .collect();
            info!(user = %user, path = %path, "Properties updated");
        } else {
            response.failed_dependency = changes
                .into_iter()
                .map(|c| c.name)
                .filter(|name| !protected.contains(name))
                .collect();
            response.forbidden = protected;
        }

        Ok(respond(
            StatusCode::MULTI_STATUS,
            Some(XML),
            build_multistatus_xml(&[response]),
        ))
    }

    async fn handle_delete(&self, user: &str, path: &str) -> AppResult<Response<String>> {
        if path.is_empty() {
            return Err(AppError::authorization("Cannot delete the root collection"));
        }
        self.resolve(user, path).await?;

        let mut backend = CustomPropertiesBackend::new(self.properties.clone(), user);
        backend.delete(path).await?;
        info!(user = %user, path = %path, "Deleted properties via WebDAV");
        Ok(respond(StatusCode::NO_CONTENT, None, String::new()))
    }

    async fn handle_move(&self, user: &str, path: &str, destination: &str) -> AppResult<Response<String>> {
        if path.is_empty() {
            return Err(AppError::authorization("Cannot move the root collection"));
        }
        let destination = destination_path(destination, user)?;
        if destination.is_empty() {
            return Err(AppError::authorization("Cannot move onto the root collection"));
        }
        self.resolve(user, path).await?;
        let existed = self.resolver.get(user, &destination).await?.is_some();

        let mut backend = CustomPropertiesBackend::new(self.properties.clone(), user);
        backend.move_path(path, &destination).await?;
        info!(user = %user, source = %path, destination = %destination, "Moved properties via WebDAV");

        let status = if existed {
            StatusCode::NO_CONTENT
        } else {
            StatusCode::CREATED
        };
        Ok(respond(status, None, String::new()))
    }
}

/// Live properties computed from the file cache.
fn live_properties(resolved: &ResolvedNode) -> Vec<(String, PropValue)> {
    let node = &resolved.node;
    let resource_type = if node.is_folder { "<d:collection/>" } else { "" };
    vec![
        (
            clark(DAV_NS, "resourcetype"),
            PropValue::Xml(resource_type.to_string()),
        ),
        (
            clark(DAV_NS, "displayname"),
            PropValue::Text(node.name.clone()),
        ),
        (
            clark(OC_NS, "fileid"),
            PropValue::Text(node.file_id.to_string()),
        ),
        (
            clark(OC_NS, "permissions"),
            PropValue::Text(permission_string(resolved)),
        ),
    ]
}

/// Compact permission string: `S` reached through a share, `R`
/// re-shareable, `D` deletable, `NV` renamable, `W` writable file, `CK`
/// folder accepting new children.
pub fn permission_string(resolved: &ResolvedNode) -> String {
    let p = resolved.permissions;
    let mut out = String::new();
    if resolved.via_share.is_some() {
        out.push('S');
    }
    if p.contains(Permissions::SHARE) {
        out.push('R');
    }
    if p.contains(Permissions::DELETE) {
        out.push('D');
    }
    if p.contains(Permissions::UPDATE) {
        out.push_str("NV");
        if !resolved.node.is_folder {
            out.push('W');
        }
    }
    if resolved.node.is_folder && p.contains(Permissions::CREATE) {
        out.push_str("CK");
    }
    out
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Encoded href of a path in a user's tree.
pub fn href(user: &str, path: &str, is_collection: bool) -> String {
    let mut href = format!("{DAV_FILES_ROOT}/{}", utf8_percent_encode(user, SEGMENT));
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        href.push('/');
        href.extend(utf8_percent_encode(segment, SEGMENT));
    }
    if is_collection || path.is_empty() {
        href.push('/');
    }
    href
}

/// Path inside the user's tree named by a `Destination` header, which may
/// be an absolute URL or an absolute path.
fn destination_path(destination: &str, user: &str) -> AppResult<String> {
    let start = destination
        .find(DAV_FILES_ROOT)
        .ok_or_else(|| AppError::validation("Destination is outside the files tree"))?;
    let rest = &destination[start + DAV_FILES_ROOT.len()..];
    let decoded = percent_decode_str(rest)
        .decode_utf8()
        .map_err(|_| AppError::validation("Destination is not valid UTF-8"))?;

    let trimmed = decoded.trim_start_matches('/');
    let (owner, path) = trimmed.split_once('/').unwrap_or((trimmed, ""));
    if owner != user {
        return Err(AppError::authorization("Cannot move into another user's files"));
    }
    normalize_path(path)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn respond(status: StatusCode, content_type: Option<&'static str>, body: String) -> Response<String> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

/// Convert an error into a DAV error document.
pub fn error_response(error: &AppError) -> Response<String> {
    let status = match error.kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %error, "DAV request failed");
        "Internal server error"
    } else {
        error.message.as_str()
    };
    respond(status, Some(XML), build_error_xml(message))
}
