//! Upvote endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::post,
};
use civicpulse_common::AppResult;
use civicpulse_core::UpvoteState;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Flip the caller's upvote and return the new count and flag.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> AppResult<ApiResponse<UpvoteState>> {
    let upvote = state.upvote_service.toggle(&report_id, &user.id).await?;
    Ok(ApiResponse::ok(upvote))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/reports/{id}/upvote", post(toggle))
}
