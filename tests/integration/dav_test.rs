//! Integration tests for the WebDAV files tree and its property store.

mod helpers;

use http::StatusCode;

const ROOT: &str = "/remote.php/dav/files/alice";

const SET_COLOR: &str = r#"<?xml version="1.0"?>
<d:propertyupdate xmlns:d="DAV:" xmlns:x="http://example.com/ns">
  <d:set><d:prop><x:color>blue</x:color></d:prop></d:set>
</d:propertyupdate>"#;

const FIND_COLOR: &str = r#"<?xml version="1.0"?>
<d:propfind xmlns:d="DAV:" xmlns:x="http://example.com/ns" xmlns:oc="http://owncloud.org/ns">
  <d:prop><x:color/><oc:fileid/><x:missing/></d:prop>
</d:propfind>"#;

#[tokio::test]
async fn test_proppatch_then_propfind() {
    let app = helpers::TestApp::new().await;
    let path = format!("{ROOT}/docs/report.txt");

    let response = app.dav("PROPPATCH", &path, SET_COLOR, Some("alice"), &[]).await;
    assert_eq!(response.status, StatusCode::MULTI_STATUS);
    assert!(response.text.contains("HTTP/1.1 200 OK"), "{}", response.text);

    let response = app
        .dav("PROPFIND", &path, FIND_COLOR, Some("alice"), &[("Depth", "0")])
        .await;
    assert_eq!(response.status, StatusCode::MULTI_STATUS);
    assert!(response.text.contains("<d:href>/remote.php/dav/files/alice/docs/report.txt</d:href>"));
    assert!(response.text.contains(r#"<color xmlns="http://example.com/ns">blue</color>"#), "{}", response.text);
    assert!(response.text.contains("<oc:fileid>"));
    assert!(response.text.contains("HTTP/1.1 404 Not Found"));
}

#[tokio::test]
async fn test_proppatch_on_protected_property_applies_nothing() {
    let app = helpers::TestApp::new().await;
    let path = format!("{ROOT}/docs");
    let body = r#"<?xml version="1.0"?>
<d:propertyupdate xmlns:d="DAV:" xmlns:x="http://example.com/ns" xmlns:oc="http://owncloud.org/ns">
  <d:set><d:prop><x:color>red</x:color><oc:permissions>RDNVCK</oc:permissions></d:prop></d:set>
</d:propertyupdate>"#;

    let response = app.dav("PROPPATCH", &path, body, Some("alice"), &[]).await;
    assert_eq!(response.status, StatusCode::MULTI_STATUS);
    assert!(response.text.contains("HTTP/1.1 403 Forbidden"));
    assert!(response.text.contains("HTTP/1.1 424 Failed Dependency"));

    let response = app
        .dav("PROPFIND", &path, FIND_COLOR, Some("alice"), &[("Depth", "0")])
        .await;
    assert!(!response.text.contains("red"), "{}", response.text);
}

#[tokio::test]
async fn test_propfind_depth_one_lists_children() {
    let app = helpers::TestApp::new().await;

    let response = app.dav("PROPFIND", ROOT, "", Some("alice"), &[("Depth", "1")]).await;
    assert_eq!(response.status, StatusCode::MULTI_STATUS);
    assert!(response.text.contains("<d:href>/remote.php/dav/files/alice/</d:href>"));
    assert!(response.text.contains("<d:href>/remote.php/dav/files/alice/docs/</d:href>"));
    assert!(response.text.contains("<d:href>/remote.php/dav/files/alice/readonly.txt</d:href>"));
    assert!(response.text.contains("<d:collection/>"));
    // not a direct child of the root
    assert!(!response.text.contains("report.txt"));
}

#[tokio::test]
async fn test_access_is_limited_to_own_tree() {
    let app = helpers::TestApp::new().await;

    let response = app.dav("PROPFIND", ROOT, "", Some("bob"), &[("Depth", "0")]).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.text.contains("<s:message>"));

    let response = app.dav("PROPFIND", ROOT, "", None, &[]).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .dav("PROPFIND", &format!("{ROOT}/nope.txt"), "", Some("alice"), &[])
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_move_carries_properties() {
    let app = helpers::TestApp::new().await;
    let source = format!("{ROOT}/docs/report.txt");
    app.dav("PROPPATCH", &source, SET_COLOR, Some("alice"), &[]).await;

    let response = app.dav("MOVE", &source, "", Some("alice"), &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let destination = format!("http://localhost:8080{ROOT}/readonly.txt");
    let response = app
        .dav("MOVE", &source, "", Some("alice"), &[("Destination", destination.as_str())])
        .await;
    // the destination already existed
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .dav("PROPFIND", &format!("{ROOT}/readonly.txt"), FIND_COLOR, Some("alice"), &[])
        .await;
    assert!(response.text.contains(">blue</color>"), "{}", response.text);

    let response = app
        .dav("PROPFIND", &source, FIND_COLOR, Some("alice"), &[])
        .await;
    assert!(!response.text.contains(">blue</color>"));

    let destination = format!("{ROOT}/renamed.txt");
    let response = app
        .dav(
            "MOVE",
            &format!("{ROOT}/readonly.txt"),
            "",
            Some("alice"),
            &[("Destination", destination.as_str())],
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_move_overwrites_destination_properties() {
    let app = helpers::TestApp::new().await;
    let source = format!("{ROOT}/docs/report.txt");
    let target = format!("{ROOT}/readonly.txt");
    let set_target = r#"<?xml version="1.0"?>
<d:propertyupdate xmlns:d="DAV:" xmlns:x="http://example.com/ns">
  <d:set><d:prop><x:color>red</x:color><x:shape>round</x:shape></d:prop></d:set>
</d:propertyupdate>"#;
    let find_both = r#"<?xml version="1.0"?>
<d:propfind xmlns:d="DAV:" xmlns:x="http://example.com/ns">
  <d:prop><x:color/><x:shape/></d:prop>
</d:propfind>"#;

    let response = app.dav("PROPPATCH", &source, SET_COLOR, Some("alice"), &[]).await;
    assert_eq!(response.status, StatusCode::MULTI_STATUS);
    let response = app.dav("PROPPATCH", &target, set_target, Some("alice"), &[]).await;
    assert_eq!(response.status, StatusCode::MULTI_STATUS);
    assert!(!response.text.contains("424"), "{}", response.text);

    let destination = format!("http://localhost:8080{target}");
    let response = app
        .dav("MOVE", &source, "", Some("alice"), &[("Destination", destination.as_str())])
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT, "{}", response.text);

    let response = app
        .dav("PROPFIND", &target, find_both, Some("alice"), &[("Depth", "0")])
        .await;
    assert_eq!(response.status, StatusCode::MULTI_STATUS);
    assert!(response.text.contains(">blue</color>"), "{}", response.text);
    assert!(!response.text.contains(">red</color>"));
    assert!(!response.text.contains(">round</shape>"));
    assert!(response.text.contains("HTTP/1.1 404 Not Found"));
}

#[tokio::test]
async fn test_delete_and_other_methods() {
    let app = helpers::TestApp::new().await;
    let path = format!("{ROOT}/docs/report.txt");
    app.dav("PROPPATCH", &path, SET_COLOR, Some("alice"), &[]).await;

    let response = app.dav("DELETE", &path, "", Some("alice"), &[]).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = app.dav("PROPFIND", &path, FIND_COLOR, Some("alice"), &[]).await;
    assert!(!response.text.contains(">blue</color>"));

    let response = app.dav("DELETE", ROOT, "", Some("alice"), &[]).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.dav("OPTIONS", ROOT, "", Some("alice"), &[]).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.dav("LOCK", &path, "", Some("alice"), &[]).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}
