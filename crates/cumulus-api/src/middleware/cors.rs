//! CORS layer configuration.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use cumulus_core::config::app::CorsConfig;

/// Methods used by OCS and WebDAV clients.
const DAV_METHODS: [&str; 8] = [
    "GET", "POST", "DELETE", "OPTIONS", "PROPFIND", "PROPPATCH", "MOVE", "HEAD",
];

/// Builds a CORS tower layer from configuration.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let methods: Vec<Method> = DAV_METHODS
        .iter()
        .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods(methods)
        .max_age(Duration::from_secs(config.max_age_seconds));

    if config.allowed_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any).allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins).allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("depth"),
            HeaderName::from_static("destination"),
            HeaderName::from_static("x-remote-user"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_for_wildcard_and_list() {
        let _ = build_cors_layer(&CorsConfig::default());
        let _ = build_cors_layer(&CorsConfig {
            allowed_origins: vec!["https://cloud.example.com".into()],
            max_age_seconds: 60,
        });
    }
}
