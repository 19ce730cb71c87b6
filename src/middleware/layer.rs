//! Tower layer that instruments an axum router.

use std::task::{Context, Poll};

use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use futures::future::BoxFuture;
use tower::{Layer, Service};

use super::instrument::RequestMeasurement;
use crate::config::PathLabel;
use crate::metrics::MetricsRecorder;

/// Applies [`InstrumentedService`] to every request reaching the wrapped
/// service.
#[derive(Clone)]
pub struct InstrumentationLayer<R> {
    recorder: R,
    path_label: PathLabel,
}

impl<R: MetricsRecorder> InstrumentationLayer<R> {
    pub fn new(recorder: R, path_label: PathLabel) -> Self {
        InstrumentationLayer {
            recorder,
            path_label,
        }
    }
}

impl<S, R: MetricsRecorder> Layer<S> for InstrumentationLayer<R> {
    type Service = InstrumentedService<S, R>;

    fn layer(&self, inner: S) -> Self::Service {
        InstrumentedService {
            inner,
            recorder: self.recorder.clone(),
            path_label: self.path_label,
        }
    }
}

/// Records request count and latency around an inner service.
///
/// The status label is taken from the response the inner service returns.
/// An inner error is recorded as `500` and handed back untouched.
#[derive(Clone)]
pub struct InstrumentedService<S, R> {
    inner: S,
    recorder: R,
    path_label: PathLabel,
}

impl<S, R, ReqBody, ResBody> Service<Request<ReqBody>> for InstrumentedService<S, R>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    R: MetricsRecorder,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let path = path_label(self.path_label, &request);
        let measurement =
            RequestMeasurement::start(self.recorder.clone(), request.method().as_str(), path);
        let future = self.inner.call(request);

        Box::pin(async move {
            match future.await {
                Ok(response) => {
                    measurement.finish(response.status());
                    Ok(response)
                }
                Err(e) => {
                    measurement.fail();
                    Err(e)
                }
            }
        })
    }
}

fn path_label<B>(policy: PathLabel, request: &Request<B>) -> String {
    let raw = request.uri().path();
    match policy {
        PathLabel::Raw => raw.to_string(),
        PathLabel::Matched => request
            .extensions()
            .get::<MatchedPath>()
            .map(|matched| matched.as_str().to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{
        HttpMetrics, MetricRegistry, DEFAULT_BUCKETS, HTTP_REQUESTS_TOTAL,
        HTTP_REQUEST_DURATION_SECONDS,
    };
    use axum::body::Body;
    use axum::http::StatusCode;
    use std::convert::Infallible;
    use tower::ServiceExt;

    fn setup() -> (MetricRegistry, HttpMetrics) {
        let registry = MetricRegistry::new();
        let metrics = HttpMetrics::new(&registry, DEFAULT_BUCKETS).unwrap();
        (registry, metrics)
    }

    fn request(method: &str, path: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn records_the_status_the_inner_service_returns() {
        let (registry, metrics) = setup();
        let service = tower::service_fn(|req: Request<Body>| async move {
            let status = if req.uri().path() == "/fail" {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            let mut response = Response::new(Body::empty());
            *response.status_mut() = status;
            Ok::<_, Infallible>(response)
        });
        let service = InstrumentationLayer::new(metrics, PathLabel::Raw).layer(service);

        let response = service.clone().oneshot(request("GET", "/ok")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = service.oneshot(request("GET", "/fail")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let snapshot = registry.snapshot();
        assert_eq!(
            snapshot.counter(HTTP_REQUESTS_TOTAL, &["GET", "/ok", "200"]),
            Some(1.0)
        );
        assert_eq!(
            snapshot.counter(HTTP_REQUESTS_TOTAL, &["GET", "/fail", "500"]),
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn inner_errors_are_returned_and_counted_as_500() {
        let (registry, metrics) = setup();
        let service = tower::service_fn(|_req: Request<Body>| async move {
            Err::<Response<Body>, _>("upstream exploded")
        });
        let service = InstrumentationLayer::new(metrics, PathLabel::Raw).layer(service);

        let err = service.oneshot(request("DELETE", "/thing")).await.unwrap_err();
        assert_eq!(err, "upstream exploded");

        let snapshot = registry.snapshot();
        assert_eq!(
            snapshot.counter(HTTP_REQUESTS_TOTAL, &["DELETE", "/thing", "500"]),
            Some(1.0)
        );
        assert_eq!(
            snapshot
                .histogram(HTTP_REQUEST_DURATION_SECONDS, &["DELETE", "/thing"])
                .unwrap()
                .count,
            1
        );
    }

    #[test]
    fn matched_policy_falls_back_to_the_raw_path() {
        let req = request("GET", "/users/42");
        assert_eq!(path_label(PathLabel::Raw, &req), "/users/42");
        assert_eq!(path_label(PathLabel::Matched, &req), "/users/42");
    }
}
