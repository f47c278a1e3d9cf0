//! OCS files_sharing handlers: list, create, show and delete shares.

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;
use tracing::{info, warn};

use cumulus_core::result::AppResult;
use cumulus_entity::share::{Permissions, Share, ShareType};
use cumulus_service::share::ShareRequest;

use crate::dto::{CreateShareParams, ShareData};
use crate::error::ApiError;
use crate::extractors::{CurrentUser, PaginationParams, Params};
use crate::ocs::{OcsError, OcsVersion};
use crate::state::AppState;

const WRONG_SHARE_ID: &str = "wrong share ID, share doesn't exist.";
const COULD_NOT_DELETE: &str = "could not delete share";

/// GET /shares
pub async fn list_shares(
    Extension(version): Extension<OcsVersion>,
    State(state): State<AppState>,
    user: Result<CurrentUser, ApiError>,
    Query(params): Query<PaginationParams>,
) -> Response {
    version.respond(list(&state, user, params).await)
}

/// POST /shares
pub async fn create_share(
    Extension(version): Extension<OcsVersion>,
    State(state): State<AppState>,
    user: Result<CurrentUser, ApiError>,
    params: Result<Params<CreateShareParams>, ApiError>,
) -> Response {
    let result = match params {
        Ok(Params(params)) => create(&state, user, params).await,
        Err(e) => Err(e.into()),
    };
    version.respond(result)
}

/// GET /shares/{id}
pub async fn get_share(
    Extension(version): Extension<OcsVersion>,
    State(state): State<AppState>,
    user: Result<CurrentUser, ApiError>,
    Path(id): Path<String>,
) -> Response {
    version.respond(show(&state, user, &id).await.map(|share| vec![share]))
}

/// DELETE /shares/{id}
pub async fn delete_share(
    Extension(version): Extension<OcsVersion>,
    State(state): State<AppState>,
    user: Result<CurrentUser, ApiError>,
    Path(id): Path<String>,
) -> Response {
    version.respond(delete(&state, user, &id).await)
}

async fn list(
    state: &AppState,
    user: Result<CurrentUser, ApiError>,
    params: PaginationParams,
) -> Result<Vec<ShareData>, OcsError> {
    let user = user?;
    let page = state
        .share_manager
        .get_shares_by(user.uid(), None, &params.into_page_request())
        .await?;

    let mut data = Vec::with_capacity(page.items.len());
    for share in &page.items {
        data.push(format_share(state, share, user.uid()).await?);
    }
    Ok(data)
}

async fn create(
    state: &AppState,
    user: Result<CurrentUser, ApiError>,
    params: CreateShareParams,
) -> Result<ShareData, OcsError> {
    let user = user?;

    let path = CreateShareParams::text(&params.path)
        .ok_or_else(|| OcsError::not_found("please specify a file or folder path"))?;
    let node = state
        .resolver
        .get(user.uid(), &path)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| OcsError::not_found("wrong path, file/folder doesn't exist"))?;

    let mut permissions = match &params.permissions {
        None => Permissions::ALL,
        Some(raw) => raw
            .as_int()
            .and_then(|bits| i32::try_from(bits).ok())
            .and_then(Permissions::from_bits)
            .ok_or_else(|| OcsError::not_found("invalid permissions"))?,
    };
    if !node.node.is_folder {
        permissions = permissions.without(Permissions::DELETE | Permissions::CREATE);
    }

    let share_type_code = params
        .share_type
        .as_ref()
        .and_then(|s| s.as_int())
        .and_then(|code| i32::try_from(code).ok())
        .unwrap_or(-1);
    let share_type = ShareType::try_from(share_type_code)
        .map_err(|_| OcsError::bad_request("unknown share type"))?;

    let share_with = CreateShareParams::text(&params.share_with);
    let mut expiration = None;
    let mut password = None;
    match share_type {
        ShareType::User => {
            let valid = match share_with.as_deref() {
                Some(uid) => state.user_repo.exists(uid).await?,
                None => false,
            };
            if !valid {
                return Err(OcsError::not_found("please specify a valid user"));
            }
        }
        ShareType::Group => {
            let valid = match share_with.as_deref() {
                Some(gid) => state.group_repo.find_by_gid(gid).await?.is_some(),
                None => false,
            };
            if !valid {
                return Err(OcsError::not_found("please specify a valid group"));
            }
        }
        ShareType::Link => {
            if !state.share_manager.share_api_allow_links() {
                return Err(OcsError::not_found(
                    "public link sharing is disabled by the administrator",
                ));
            }

            if params.public_upload.as_ref().is_some_and(|v| v.is_true()) {
                if !state.share_manager.share_api_link_allow_public_upload() {
                    return Err(OcsError::forbidden(
                        "public upload disabled by the administrator",
                    ));
                }
                if !node.node.is_folder {
                    return Err(OcsError::not_found(
                        "public upload is only possible for public shared folders",
                    ));
                }
                permissions = Permissions::READ | Permissions::CREATE | Permissions::UPDATE;
            } else {
                permissions = Permissions::READ;
            }

            password = CreateShareParams::text(&params.password);

            if let Some(raw) = CreateShareParams::text(&params.expire_date) {
                let date = parse_expire_date(&raw)
                    .ok_or_else(|| OcsError::not_found("Invalid Date. Format must be YYYY-MM-DD."))?;
                expiration = Some(date.and_time(NaiveTime::MIN).and_utc());
            }
        }
        ShareType::Remote => {}
    }

    let request = ShareRequest {
        share_type: share_type_code,
        shared_with: match share_type {
            ShareType::Link => None,
            _ => share_with,
        },
        shared_by: Some(user.uid().to_string()),
        node: Some(node),
        permissions,
        expiration,
        password,
    };

    let share = state
        .share_manager
        .create_share(request)
        .await
        .map_err(|e| {
            if e.kind.is_caller_error() {
                OcsError::not_found(e.message)
            } else {
                OcsError::from(e)
            }
        })?;

    info!(share_id = share.id, uid = %user.uid(), path = %path, "Share created via OCS");
    Ok(format_share(state, &share, user.uid()).await?)
}

/// A calendar date written exactly as `YYYY-MM-DD`.
fn parse_expire_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

async fn show(
    state: &AppState,
    user: Result<CurrentUser, ApiError>,
    id: &str,
) -> Result<ShareData, OcsError> {
    let user = user?;
    let share = find_share(state, id).await?;
    if !state.share_access.can_access(&share, user.uid()).await? {
        return Err(OcsError::not_found(WRONG_SHARE_ID));
    }
    Ok(format_share(state, &share, user.uid()).await?)
}

async fn delete(
    state: &AppState,
    user: Result<CurrentUser, ApiError>,
    id: &str,
) -> Result<Value, OcsError> {
    let user = user?;
    let share = find_share(state, id).await?;
    if !state.share_access.can_access(&share, user.uid()).await? {
        return Err(OcsError::not_found(COULD_NOT_DELETE));
    }

    match state.share_manager.delete_share(&share, Some(user.uid())).await {
        Ok(deleted) => {
            info!(share_id = share.id, uid = %user.uid(), deleted = deleted.len(), "Share deleted via OCS");
            Ok(Value::Array(Vec::new()))
        }
        Err(e) => {
            warn!(share_id = share.id, error = %e, "Share deletion failed");
            Err(OcsError::not_found(COULD_NOT_DELETE))
        }
    }
}

async fn find_share(state: &AppState, id: &str) -> Result<Share, OcsError> {
    let Ok(id) = id.parse::<i64>() else {
        return Err(OcsError::not_found(WRONG_SHARE_ID));
    };
    state.share_manager.get_share_by_id(id).await.map_err(|e| {
        if e.is_not_found() {
            OcsError::not_found(WRONG_SHARE_ID)
        } else {
            OcsError::from(e)
        }
    })
}

async fn display_name(state: &AppState, uid: &str) -> AppResult<String> {
    Ok(state
        .user_repo
        .find_by_uid(uid)
        .await?
        .map(|u| u.display_name_or_uid().to_string())
        .unwrap_or_else(|| uid.to_string()))
}

/// Render a share for `viewer`.
pub async fn format_share(state: &AppState, share: &Share, viewer: &str) -> AppResult<ShareData> {
    let node = state.resolver.get_by_id(share.file_source).await?;

    let path = node.as_ref().map(|n| {
        if n.owner == viewer {
            n.user_path()
        } else {
            share.file_target.clone()
        }
    });

    let share_with_displayname = match (share.share_type, share.share_with.as_deref()) {
        (ShareType::User, Some(uid)) => Some(display_name(state, uid).await?),
        (ShareType::Group, Some(gid)) => Some(
            state
                .group_repo
                .find_by_gid(gid)
                .await?
                .map(|g| g.display_name)
                .unwrap_or_else(|| gid.to_string()),
        ),
        (_, with) => with.map(str::to_string),
    };

    let url = match (share.share_type, share.token.as_deref()) {
        (ShareType::Link, Some(token)) => Some(format!(
            "{}/index.php/s/{}",
            state.config.server.public_url.trim_end_matches('/'),
            token
        )),
        _ => None,
    };

    Ok(ShareData {
        id: share.id,
        share_type: share.share_type.code(),
        uid_owner: share.shared_by().to_string(),
        displayname_owner: display_name(state, share.shared_by()).await?,
        uid_file_owner: share.share_owner().to_string(),
        displayname_file_owner: display_name(state, share.share_owner()).await?,
        permissions: share.permissions.bits(),
        stime: share.stime,
        parent: share.parent,
        expiration: share
            .expiration
            .map(|at| at.format("%Y-%m-%d 00:00:00").to_string()),
        token: share.token.clone(),
        path,
        item_type: share.item_type.clone(),
        storage_id: node.as_ref().map(|n| n.storage_string_id.clone()),
        storage: node.as_ref().map(|n| n.storage),
        item_source: share.item_source,
        file_source: share.file_source,
        file_parent: node.as_ref().map(|n| n.parent),
        file_target: share.file_target.clone(),
        share_with: share.share_with.clone(),
        share_with_displayname,
        url,
        mail_send: i32::from(share.mail_send),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expire_date_must_be_zero_padded() {
        assert_eq!(parse_expire_date("2030-01-05"), NaiveDate::from_ymd_opt(2030, 1, 5));
        assert_eq!(parse_expire_date("2030-1-5"), None);
        assert_eq!(parse_expire_date("2030-02-30"), None);
        assert_eq!(parse_expire_date("2030/01/05"), None);
        assert_eq!(parse_expire_date("+2030-01-0"), None);
    }
}
