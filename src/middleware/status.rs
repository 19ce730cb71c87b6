//! Response sinks and the status-capturing decorator.

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::warn;

/// The write side of a response as seen by a sink-style handler.
pub trait ResponseSink: Send {
    /// Sets the response status. Returns `false` when the sink no longer
    /// accepts a status, e.g. because the head has already been committed.
    fn set_status(&mut self, status: StatusCode) -> bool;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Appends to the response body.
    fn write(&mut self, chunk: &[u8]);
}

/// Decorates a [`ResponseSink`] and remembers the status the handler set.
///
/// Every call is forwarded unchanged. The recorded status only moves when
/// the wrapped sink accepts the new value, so single-status sinks keep the
/// first explicit code and permissive sinks track the latest one. Until the
/// handler sets anything the default status is reported.
pub struct StatusCapturingResponder<'a, S: ResponseSink + ?Sized> {
    inner: &'a mut S,
    status: StatusCode,
}

impl<'a, S: ResponseSink + ?Sized> StatusCapturingResponder<'a, S> {
    pub fn new(inner: &'a mut S) -> Self {
        Self::with_default(inner, StatusCode::OK)
    }

    pub fn with_default(inner: &'a mut S, status: StatusCode) -> Self {
        StatusCapturingResponder { inner, status }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<S: ResponseSink + ?Sized> ResponseSink for StatusCapturingResponder<'_, S> {
    fn set_status(&mut self, status: StatusCode) -> bool {
        let accepted = self.inner.set_status(status);
        if accepted {
            self.status = status;
        }
        accepted
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write(&mut self, chunk: &[u8]) {
        self.inner.write(chunk)
    }
}

/// An in-memory response that behaves like a streaming writer: the status is
/// fixed by the first explicit `set_status` or by the first body write
/// (which commits `200 OK`).
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl ResponseSink for BufferedResponse {
    fn set_status(&mut self, status: StatusCode) -> bool {
        match self.status {
            Some(current) => {
                warn!(
                    current = current.as_u16(),
                    ignored = status.as_u16(),
                    "Superfluous status write ignored"
                );
                false
            }
            None => {
                self.status = Some(status);
                true
            }
        }
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write(&mut self, chunk: &[u8]) {
        self.status.get_or_insert(StatusCode::OK);
        self.body.extend_from_slice(chunk);
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}
