//! OCS response envelope.
//!
//! Every OCS endpoint answers `{"ocs":{"meta":{..},"data":..}}`. Version 1
//! always uses HTTP 200 and reports the outcome in `meta.statuscode`
//! (100 on success); version 2 reports 200 on success and mirrors error
//! codes into the HTTP status.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use cumulus_core::error::{AppError, ErrorKind};

use crate::error::ApiError;

/// Generic server failure.
pub const CODE_SERVER_ERROR: u16 = 996;
/// Caller not authenticated.
pub const CODE_UNAUTHORISED: u16 = 997;

/// OCS API generation, chosen by the `/ocs/v1.php` or `/ocs/v2.php` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcsVersion {
    /// `/ocs/v1.php`
    V1,
    /// `/ocs/v2.php`
    V2,
}

impl OcsVersion {
    /// Status code reported on success.
    pub fn success_code(self) -> u16 {
        match self {
            Self::V1 => 100,
            Self::V2 => 200,
        }
    }

    fn http_status(self, code: u16) -> StatusCode {
        match self {
            Self::V1 => StatusCode::OK,
            Self::V2 => match code {
                100 | 200 => StatusCode::OK,
                CODE_UNAUTHORISED => StatusCode::UNAUTHORIZED,
                CODE_SERVER_ERROR => StatusCode::INTERNAL_SERVER_ERROR,
                other => StatusCode::from_u16(other).unwrap_or(StatusCode::BAD_REQUEST),
            },
        }
    }

    /// Render a handler result as an OCS envelope.
    pub fn respond<T: Serialize>(self, result: Result<T, OcsError>) -> Response {
        let (code, message, data) = match result {
            Ok(data) => match serde_json::to_value(data) {
                Ok(data) => (self.success_code(), None, data),
                Err(e) => {
                    let e = OcsError::from(AppError::from(e));
                    (e.code, Some(e.message), Value::Array(Vec::new()))
                }
            },
            Err(e) => (e.code, Some(e.message), Value::Array(Vec::new())),
        };

        let ok = code == self.success_code();
        let body = Envelope {
            ocs: Ocs {
                meta: Meta {
                    status: if ok { "ok" } else { "failure" },
                    statuscode: code,
                    message,
                },
                data,
            },
        };
        (self.http_status(code), Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct Envelope {
    ocs: Ocs,
}

#[derive(Debug, Serialize)]
struct Ocs {
    meta: Meta,
    data: Value,
}

#[derive(Debug, Serialize)]
struct Meta {
    status: &'static str,
    statuscode: u16,
    message: Option<String>,
}

/// A failed OCS call: status code plus message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcsError {
    /// OCS status code.
    pub code: u16,
    /// Message shown to the client.
    pub message: String,
}

impl OcsError {
    /// Create an error with an explicit code.
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// 400.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    /// 403.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, message)
    }

    /// 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }
}

impl From<ApiError> for OcsError {
    fn from(ApiError(err): ApiError) -> Self {
        err.into()
    }
}

impl From<AppError> for OcsError {
    fn from(err: AppError) -> Self {
        match err.kind {
            ErrorKind::NotFound => Self::not_found(err.message),
            ErrorKind::Validation | ErrorKind::Conflict => Self::bad_request(err.message),
            ErrorKind::Authorization => Self::forbidden(err.message),
            ErrorKind::Authentication => Self::new(CODE_UNAUTHORISED, "Unauthorised"),
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Serialization => {
                tracing::error!(error = %err, "OCS request failed");
                Self::new(CODE_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn test_v1_success_envelope() {
        let response = OcsVersion::V1.respond(Ok(serde_json::json!({"id": 1})));
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ocs"]["meta"]["statuscode"], 100);
        assert_eq!(body["ocs"]["meta"]["status"], "ok");
        assert_eq!(body["ocs"]["data"]["id"], 1);
    }

    #[tokio::test]
    async fn test_v1_errors_keep_http_200() {
        let response =
            OcsVersion::V1.respond::<()>(Err(OcsError::not_found("wrong share ID, share doesn't exist.")));
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ocs"]["meta"]["statuscode"], 404);
        assert_eq!(body["ocs"]["meta"]["status"], "failure");
        assert_eq!(
            body["ocs"]["meta"]["message"],
            "wrong share ID, share doesn't exist."
        );
    }

    #[tokio::test]
    async fn test_v2_mirrors_status() {
        let response = OcsVersion::V2.respond::<()>(Err(OcsError::forbidden("nope")));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let response = OcsVersion::V2.respond::<()>(Err(OcsError::new(CODE_UNAUTHORISED, "x")));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let response = OcsVersion::V2.respond(Ok(Vec::<i32>::new()));
        assert_eq!(body_json(response).await["ocs"]["meta"]["statuscode"], 200);
    }

    #[test]
    fn test_app_error_mapping() {
        assert_eq!(OcsError::from(AppError::not_found("x")).code, 404);
        assert_eq!(OcsError::from(AppError::validation("x")).code, 400);
        assert_eq!(OcsError::from(AppError::internal("x")).code, CODE_SERVER_ERROR);
        let rejected = ApiError(AppError::authentication("Unknown user"));
        assert_eq!(OcsError::from(rejected).code, CODE_UNAUTHORISED);
    }
}
