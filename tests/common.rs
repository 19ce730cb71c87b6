#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use reqmeter::config::{extract, ConfigV1};
use reqmeter::metrics::MetricRegistry;
use reqmeter::routes::create_router;
use reqmeter::startup::build_state;
use tower::ServiceExt;

pub const FRONTEND_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:0
service:
  name: service-a
  role: frontend
logging:
  level: debug
  format: json
"#;

pub const BACKEND_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:0
service:
  name: service-b
  role: backend
logging:
  level: debug
  format: console
"#;

pub fn load_test_config(yaml: &str) -> ConfigV1 {
    extract(&Figment::new().merge(Yaml::string(yaml))).expect("Failed to parse test config YAML")
}

/// Builds the router and hands back the registry it records into.
pub fn build_app(config: ConfigV1) -> (Router, MetricRegistry) {
    let state = build_state(Arc::new(config)).expect("state should build");
    let registry = state.metrics.registry().clone();
    (create_router(state), registry)
}

pub fn request(method: Method, path: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn send(app: &Router, method: Method, path: &str) -> Response<Body> {
    app.clone()
        .oneshot(request(method, path))
        .await
        .expect("router is infallible")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}
