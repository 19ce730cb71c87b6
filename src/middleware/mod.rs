//! Request instrumentation.
//!
//! [`InstrumentationLayer`] wraps an axum router; [`Instrumented`] wraps
//! sink-style [`Handler`]s. Both record through [`RequestMeasurement`].

mod instrument;
mod layer;
mod status;

pub use instrument::{
    Handler, Instrumented, RequestInfo, RequestMeasurement, CLIENT_CLOSED_REQUEST,
};
pub use layer::{InstrumentationLayer, InstrumentedService};
pub use status::{BufferedResponse, ResponseSink, StatusCapturingResponder};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};

/// Serves a sink-style handler as an axum handler.
pub async fn respond<H: Handler>(handler: &H, request: Request) -> Response {
    let (parts, _body) = request.into_parts();
    let info = RequestInfo::from_parts(&parts);
    let mut sink = BufferedResponse::new();
    handler.serve(&info, &mut sink).await;
    sink.into_response()
}
