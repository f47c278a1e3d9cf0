//! `CurrentUser` extractor: reads the uid set by the authenticating proxy.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use cumulus_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The already-authenticated user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    /// The user's uid.
    pub fn uid(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for CurrentUser {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = state.config.dav.user_header.as_str();
        let uid = parts
            .headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::authentication(format!("Missing {header} header")))?;

        if !state.user_repo.exists(uid).await? {
            return Err(AppError::authentication("Unknown user").into());
        }

        Ok(CurrentUser(uid.to_string()))
    }
}
