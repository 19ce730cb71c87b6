mod common;

use axum::extract::Path;
use axum::http::{Method, StatusCode};
use axum::routing::get;
use axum::Router;
use common::send;
use reqmeter::config::PathLabel;
use reqmeter::metrics::{
    HttpMetrics, MetricRegistry, DEFAULT_BUCKETS, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION_SECONDS,
};
use reqmeter::middleware::InstrumentationLayer;

fn instrumented(router: Router, path_label: PathLabel) -> (Router, MetricRegistry) {
    let registry = MetricRegistry::new();
    let metrics = HttpMetrics::new(&registry, DEFAULT_BUCKETS).unwrap();
    (
        router.layer(InstrumentationLayer::new(metrics, path_label)),
        registry,
    )
}

#[tokio::test]
async fn server_errors_are_a_separate_series() {
    let router = Router::new()
        .route("/hello", get(|| async { "hello" }))
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "broken") }),
        );
    let (app, registry) = instrumented(router, PathLabel::Raw);

    send(&app, Method::GET, "/hello").await;
    let response = send(&app, Method::GET, "/broken").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    send(&app, Method::GET, "/broken").await;

    let snapshot = registry.snapshot();
    assert_eq!(
        snapshot.counter(HTTP_REQUESTS_TOTAL, &["GET", "/broken", "500"]),
        Some(2.0)
    );
    assert_eq!(
        snapshot.counter(HTTP_REQUESTS_TOTAL, &["GET", "/broken", "200"]),
        None
    );
    assert_eq!(
        snapshot.counter(HTTP_REQUESTS_TOTAL, &["GET", "/hello", "200"]),
        Some(1.0)
    );
}

#[tokio::test]
async fn raw_paths_grow_cardinality_matched_paths_do_not() {
    let router = || {
        Router::new().route(
            "/users/:id",
            get(|Path(id): Path<u32>| async move { id.to_string() }),
        )
    };

    let (raw_app, raw) = instrumented(router(), PathLabel::Raw);
    let (matched_app, matched) = instrumented(router(), PathLabel::Matched);
    for id in 1..=5 {
        send(&raw_app, Method::GET, &format!("/users/{id}")).await;
        send(&matched_app, Method::GET, &format!("/users/{id}")).await;
    }

    let raw = raw.snapshot();
    let family = raw.family(HTTP_REQUESTS_TOTAL).unwrap();
    assert_eq!(family.samples.len(), 5);
    assert_eq!(
        raw.counter(HTTP_REQUESTS_TOTAL, &["GET", "/users/3", "200"]),
        Some(1.0)
    );

    let matched = matched.snapshot();
    assert_eq!(matched.family(HTTP_REQUESTS_TOTAL).unwrap().samples.len(), 1);
    assert_eq!(
        matched.counter(HTTP_REQUESTS_TOTAL, &["GET", "/users/:id", "200"]),
        Some(5.0)
    );
    assert_eq!(
        matched
            .histogram(HTTP_REQUEST_DURATION_SECONDS, &["GET", "/users/:id"])
            .unwrap()
            .count,
        5
    );
}

#[tokio::test]
async fn response_passes_through_unchanged() {
    let router = Router::new().route(
        "/teapot",
        get(|| async {
            (
                StatusCode::IM_A_TEAPOT,
                [("x-brew", "earl-grey")],
                "short and stout",
            )
        }),
    );
    let (app, registry) = instrumented(router, PathLabel::Raw);

    let response = send(&app, Method::GET, "/teapot").await;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(response.headers()["x-brew"], "earl-grey");
    assert_eq!(common::body_string(response).await, "short and stout");
    assert_eq!(
        registry
            .snapshot()
            .counter(HTTP_REQUESTS_TOTAL, &["GET", "/teapot", "418"]),
        Some(1.0)
    );
}
