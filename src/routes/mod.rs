//! Router assembly and the HTTP middleware stack.

mod common;
mod users;

pub use common::common_routes;
pub use users::user_routes;

use crate::config::ServerConfig;
use crate::state::AppState;
use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// All routes behind tracing, permissive CORS, a request timeout, a body size bound, and one
/// in-flight request bound shared by every route.
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(user_routes(state))
        // Separate layer call: routes are re-boxed, so the outer layers see plain `Body` responses.
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(config.request_timeout))
                .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests)),
        )
}
