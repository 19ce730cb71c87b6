//! HTTP route definitions and handlers.
//!
//! Health and metrics endpoints are shared; the remaining routes depend on
//! the configured service role. The whole router, fallbacks included, sits
//! behind the instrumentation layer.

mod backend_routes;
mod frontend_routes;
mod health_routes;
mod metrics;

use crate::config::ServiceRole;
use crate::middleware::InstrumentationLayer;
use crate::state::AppState;
use axum::Router;

/// Creates the application router for the configured role.
pub fn create_router(state: AppState) -> Router {
    let role_routes = match state.config.service.role {
        ServiceRole::Frontend => frontend_routes::routes(),
        ServiceRole::Backend => backend_routes::routes(),
    };
    let instrumentation =
        InstrumentationLayer::new(state.metrics.clone(), state.config.metrics.path_label);

    Router::new()
        .merge(health_routes::routes())
        .merge(metrics::routes())
        .merge(role_routes)
        .with_state(state)
        .layer(instrumentation)
}
