//! API endpoints.

mod auth;
mod reports;
mod upvotes;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(reports::router())
        .merge(upvotes::router())
}
