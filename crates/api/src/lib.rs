//! HTTP API layer for civicpulse.
//!
//! This crate exposes the report backend over REST:
//!
//! - **Endpoints**: authentication, personal and community reports, upvotes, areas
//! - **Extractors**: authenticated and optional users
//! - **Middleware**: API key check and bearer token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};
use tower_http::limit::RequestBodyLimitLayer;

pub use endpoints::router;
pub use middleware::AppState;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// The API mounted under `/api` with authentication applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::api_key_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
