//! Integration tests for the OCS share API.

mod helpers;

use http::StatusCode;
use serde_json::json;

use cumulus_core::config::AppConfig;

const V1: &str = "/ocs/v1.php/apps/files_sharing/api/v1/shares";
const V2: &str = "/ocs/v2.php/apps/files_sharing/api/v1/shares";

#[tokio::test]
async fn test_create_user_share_with_form() {
    let app = helpers::TestApp::new().await;

    let response = app
        .form("POST", V1, "path=%2Fdocs%2Freport.txt&shareType=0&shareWith=bob", Some("alice"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.ocs_code(), 100, "{}", response.text);
    let data = response.ocs_data();
    assert_eq!(data["share_type"], 0);
    assert_eq!(data["share_with"], "bob");
    assert_eq!(data["share_with_displayname"], "Bob");
    assert_eq!(data["uid_owner"], "alice");
    assert_eq!(data["displayname_owner"], "Alice");
    assert_eq!(data["item_type"], "file");
    assert_eq!(data["file_target"], "/report.txt");
    assert_eq!(data["path"], "/docs/report.txt");
    assert_eq!(data["storage_id"], "home::alice");
    // all bits requested; DELETE and CREATE dropped for a file
    assert_eq!(data["permissions"], 19);
    assert!(data["parent"].is_null());
    assert!(data.get("url").is_none());
}

#[tokio::test]
async fn test_create_validation_messages() {
    let app = helpers::TestApp::new().await;
    let cases = [
        (json!({"shareType": 0, "shareWith": "bob"}), 404, "please specify a file or folder path"),
        (json!({"path": "/nope", "shareType": 0}), 404, "wrong path, file/folder doesn't exist"),
        (json!({"path": "/docs", "shareType": 0, "permissions": 32}), 404, "invalid permissions"),
        (json!({"path": "/docs", "shareType": 0, "shareWith": "zed"}), 404, "please specify a valid user"),
        (json!({"path": "/docs", "shareType": 1, "shareWith": "nogroup"}), 404, "please specify a valid group"),
        (json!({"path": "/docs", "shareType": 2}), 400, "unknown share type"),
        (
            json!({"path": "/docs", "shareType": 3, "expireDate": "31-12-2030"}),
            404,
            "Invalid Date. Format must be YYYY-MM-DD.",
        ),
        (
            json!({"path": "/docs", "shareType": 3, "expireDate": "2030-1-5"}),
            404,
            "Invalid Date. Format must be YYYY-MM-DD.",
        ),
        (
            json!({"path": "/readonly.txt", "shareType": 3, "publicUpload": "true"}),
            404,
            "public upload is only possible for public shared folders",
        ),
        (
            json!({"path": "/readonly.txt", "shareType": 1, "shareWith": "staff"}),
            404,
            "Cannot increase permissions",
        ),
    ];

    for (body, code, message) in cases {
        let response = app.request("POST", V1, Some(body.clone()), Some("alice")).await;
        assert_eq!(response.status, StatusCode::OK, "{body}");
        assert_eq!(response.ocs_code(), code, "{body}");
        assert_eq!(response.ocs_message(), message, "{body}");
    }
}

#[tokio::test]
async fn test_v2_mirrors_error_status() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request("POST", V2, Some(json!({"path": "/nope", "shareType": 0})), Some("alice"))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.ocs_code(), 404);

    let response = app
        .request(
            "POST",
            V2,
            Some(json!({"path": "/docs", "shareType": 1, "shareWith": "staff"})),
            Some("alice"),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.ocs_code(), 200);
}

#[tokio::test]
async fn test_link_share_with_public_upload() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            V1,
            Some(json!({
                "path": "/docs",
                "shareType": 3,
                "publicUpload": "true",
                "password": "s3cret",
                "expireDate": "2099-01-15",
            })),
            Some("alice"),
        )
        .await;

    assert_eq!(response.ocs_code(), 100, "{}", response.text);
    let data = response.ocs_data();
    assert_eq!(data["permissions"], 7);
    assert!(data["share_with"].is_null());
    assert_eq!(data["expiration"], "2099-01-15 00:00:00");
    let token = data["token"].as_str().expect("token");
    assert_eq!(token.len(), 15);
    assert_eq!(
        data["url"],
        format!("http://localhost:8080/index.php/s/{token}")
    );

    let share = app
        .state
        .share_manager
        .get_share_by_token(token)
        .await
        .expect("share by token");
    assert!(app.state.share_manager.check_password(&share, "s3cret").expect("verify"));
    assert!(!app.state.share_manager.check_password(&share, "wrong").expect("verify"));
}

#[tokio::test]
async fn test_link_policy_is_enforced() {
    let mut config = AppConfig::default();
    config.sharing.allow_public_upload = false;
    let app = helpers::TestApp::with_config(config).await;
    let response = app
        .request(
            "POST",
            V1,
            Some(json!({"path": "/docs", "shareType": 3, "publicUpload": true})),
            Some("alice"),
        )
        .await;
    assert_eq!(response.ocs_code(), 403);
    assert_eq!(response.ocs_message(), "public upload disabled by the administrator");

    let mut config = AppConfig::default();
    config.sharing.allow_links = false;
    let app = helpers::TestApp::with_config(config).await;
    let response = app
        .request("POST", V1, Some(json!({"path": "/docs", "shareType": 3})), Some("alice"))
        .await;
    assert_eq!(response.ocs_code(), 404);
    assert_eq!(
        response.ocs_message(),
        "public link sharing is disabled by the administrator"
    );
}

#[tokio::test]
async fn test_get_share_access_rules() {
    let app = helpers::TestApp::new().await;
    let created = app
        .request(
            "POST",
            V1,
            Some(json!({"path": "/docs", "shareType": 1, "shareWith": "staff", "permissions": 1})),
            Some("alice"),
        )
        .await;
    assert_eq!(created.ocs_code(), 100, "{}", created.text);
    let id = created.ocs_data()["id"].as_i64().expect("id");

    // bob is in staff
    let response = app.request("GET", &format!("{V1}/{id}"), None, Some("bob")).await;
    assert_eq!(response.ocs_code(), 100);
    assert_eq!(response.ocs_data()[0]["share_with_displayname"], "Staff");
    assert_eq!(response.ocs_data()[0]["path"], "/docs");

    let response = app.request("GET", &format!("{V1}/{id}"), None, Some("carol")).await;
    assert_eq!(response.ocs_code(), 404);
    assert_eq!(response.ocs_message(), "wrong share ID, share doesn't exist.");

    let response = app.request("GET", &format!("{V1}/4242"), None, Some("alice")).await;
    assert_eq!(response.ocs_message(), "wrong share ID, share doesn't exist.");
}

#[tokio::test]
async fn test_delete_cascades_to_reshares() {
    let app = helpers::TestApp::new().await;

    let root = app
        .request(
            "POST",
            V1,
            Some(json!({"path": "/docs", "shareType": 0, "shareWith": "bob"})),
            Some("alice"),
        )
        .await;
    let root_id = root.ocs_data()["id"].as_i64().expect("root id");

    // bob re-shares the folder he received
    let child = app
        .request(
            "POST",
            V1,
            Some(json!({"path": "/docs", "shareType": 0, "shareWith": "carol", "permissions": 17})),
            Some("bob"),
        )
        .await;
    assert_eq!(child.ocs_code(), 100, "{}", child.text);
    assert_eq!(child.ocs_data()["parent"], root_id);
    assert_eq!(child.ocs_data()["uid_file_owner"], "alice");
    assert_eq!(child.ocs_data()["path"], "/docs");
    let child_id = child.ocs_data()["id"].as_i64().expect("child id");

    // carol may not delete the root share
    let response = app.request("DELETE", &format!("{V1}/{root_id}"), None, Some("carol")).await;
    assert_eq!(response.ocs_code(), 404);
    assert_eq!(response.ocs_message(), "could not delete share");

    let response = app.request("DELETE", &format!("{V1}/{root_id}"), None, Some("alice")).await;
    assert_eq!(response.ocs_code(), 100);

    for id in [root_id, child_id] {
        let response = app.request("GET", &format!("{V1}/{id}"), None, Some("alice")).await;
        assert_eq!(response.ocs_message(), "wrong share ID, share doesn't exist.");
    }

    let response = app.request("DELETE", &format!("{V1}/{root_id}"), None, Some("alice")).await;
    assert_eq!(response.ocs_message(), "wrong share ID, share doesn't exist.");
}

#[tokio::test]
async fn test_list_shares_pages() {
    let app = helpers::TestApp::new().await;
    for with in ["bob", "carol"] {
        let response = app
            .request(
                "POST",
                V1,
                Some(json!({"path": "/docs/report.txt", "shareType": 0, "shareWith": with})),
                Some("alice"),
            )
            .await;
        assert_eq!(response.ocs_code(), 100);
    }

    let response = app.request("GET", V1, None, Some("alice")).await;
    assert_eq!(response.ocs_data().as_array().map(Vec::len), Some(2));

    let response = app.request("GET", &format!("{V1}?limit=1&offset=1"), None, Some("alice")).await;
    let data = response.ocs_data().as_array().cloned().unwrap_or_default();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["share_with"], "carol");

    let response = app.request("GET", V1, None, Some("bob")).await;
    assert_eq!(response.ocs_data().as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_missing_user_is_unauthorised() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", V1, None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.ocs_code(), 997);

    let response = app.request("GET", V2, None, Some("mallory")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
