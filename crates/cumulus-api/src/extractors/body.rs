//! Request parameters read from a JSON body, a form body or the query
//! string, depending on the content type.

use axum::extract::{Form, FromRequest, Json, Query, Request};
use axum::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use cumulus_core::error::AppError;

use crate::error::ApiError;

/// Parameters deserialized from whatever encoding the client used.
#[derive(Debug, Clone, Default)]
pub struct Params<T>(pub T);

impl<S, T> FromRequest<S> for Params<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            Ok(Self(value))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            Ok(Self(value))
        } else {
            let Query(value) = Query::<T>::try_from_uri(req.uri())
                .map_err(|e| AppError::validation(e.body_text()))?;
            Ok(Self(value))
        }
    }
}
