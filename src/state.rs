//! Shared application state.
//!
//! Contains the state that is shared across all request handlers: the
//! configuration, the metric set recorded by the middleware, and the client
//! used to reach the upstream service.

use crate::config::ConfigV1;
use crate::metrics::HttpMetrics;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request handler; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Request metrics and the registry they live in.
    pub metrics: HttpMetrics,
    /// Client for outbound calls to the upstream service.
    pub http_client: reqwest::Client,
}
