//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use civicpulse_common::AppError;
use civicpulse_core::{ProfileService, ReportService, UpvoteService, client::API_KEY_HEADER};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub profile_service: ProfileService,
    pub report_service: ReportService,
    pub upvote_service: UpvoteService,
    /// Key every request must carry, if set.
    pub api_key: Option<String>,
}

/// Reject requests without the configured API key.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(expected) = &state.api_key {
        let provided = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            tracing::debug!(path = %req.uri().path(), "Missing or wrong API key");
            return AppError::Unauthorized.into_response();
        }
    }

    next.run(req).await
}

/// Authentication middleware.
///
/// A valid bearer token attaches the caller's profile to the request; an
/// invalid one is ignored and the handler decides whether auth is needed.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.profile_service.authenticate_by_token(token).await {
            Ok(profile) => {
                req.extensions_mut().insert(profile);
            }
            Err(AppError::Unauthorized) => {}
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}
