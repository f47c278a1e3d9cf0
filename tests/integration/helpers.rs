//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use cumulus_api::{AppState, build_app};
use cumulus_core::config::AppConfig;
use cumulus_database::DatabasePool;
use cumulus_entity::share::Permissions;
use cumulus_entity::user::CreateUser;

/// Header carrying the authenticated user in tests.
pub const USER_HEADER: &str = "x-remote-user";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application state, for direct service access
    pub state: AppState,
    /// Keeps the in-memory database alive
    pub db: DatabasePool,
}

impl TestApp {
    /// Create a test application with default configuration.
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// Create a test application on a fresh in-memory database seeded
    /// with alice, bob and carol, a `staff` group holding bob, and a few
    /// files in alice's home.
    pub async fn with_config(config: AppConfig) -> Self {
        let db = DatabasePool::in_memory()
            .await
            .expect("Failed to open test database");
        let state = AppState::build(config, db.pool().clone()).await;

        for uid in ["alice", "bob", "carol"] {
            let mut name = uid.to_string();
            name[..1].make_ascii_uppercase();
            state
                .user_repo
                .create(&CreateUser {
                    uid: uid.to_string(),
                    display_name: name,
                    ..CreateUser::default()
                })
                .await
                .expect("Failed to create user");
        }
        state
            .group_repo
            .create("staff", "Staff")
            .await
            .expect("Failed to create group");
        state
            .group_repo
            .add_member("staff", "bob")
            .await
            .expect("Failed to add member");

        for (path, is_folder, permissions) in [
            ("docs", true, Permissions::ALL),
            ("docs/report.txt", false, Permissions(27)),
            ("readonly.txt", false, Permissions(17)),
        ] {
            state
                .resolver
                .create("alice", path, is_folder, permissions)
                .await
                .expect("Failed to create node");
        }

        Self {
            router: build_app(state.clone()),
            state,
            db,
        }
    }

    /// Send a JSON request.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        if let Some(user) = user {
            req = req.header(USER_HEADER, user);
        }
        self.send(req.body(Body::from(body_str)).expect("Failed to build request"))
            .await
    }

    /// Send a form-encoded request.
    pub async fn form(&self, method: &str, path: &str, form: &str, user: Option<&str>) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/x-www-form-urlencoded");
        if let Some(user) = user {
            req = req.header(USER_HEADER, user);
        }
        self.send(req.body(Body::from(form.to_string())).expect("Failed to build request"))
            .await
    }

    /// Send a WebDAV request with an XML body and extra headers.
    pub async fn dav(
        &self,
        method: &str,
        path: &str,
        body: &str,
        user: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/xml");
        if let Some(user) = user {
            req = req.header(USER_HEADER, user);
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        self.send(req.body(Body::from(body.to_string())).expect("Failed to build request"))
            .await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }
}

/// Test response wrapper
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body, `Null` when not JSON
    pub body: Value,
    /// Raw body
    pub text: String,
}

impl TestResponse {
    /// `ocs.meta.statuscode`
    pub fn ocs_code(&self) -> i64 {
        self.body["ocs"]["meta"]["statuscode"].as_i64().unwrap_or(-1)
    }

    /// `ocs.meta.message`
    pub fn ocs_message(&self) -> &str {
        self.body["ocs"]["meta"]["message"].as_str().unwrap_or("")
    }

    /// `ocs.data`
    pub fn ocs_data(&self) -> &Value {
        &self.body["ocs"]["data"]
    }
}
