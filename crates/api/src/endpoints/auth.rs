//! Authentication endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use civicpulse_common::AppResult;
use civicpulse_core::{Session, SigninInput, SignupInput};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{self, ApiResponse},
};

/// Create a new account.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupInput>,
) -> AppResult<ApiResponse<Session>> {
    let session = state.profile_service.signup(req).await?;
    Ok(ApiResponse::created(session))
}

/// Sign in to an existing account.
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninInput>,
) -> AppResult<ApiResponse<Session>> {
    let session = state.profile_service.signin(req).await?;
    Ok(ApiResponse::ok(session))
}

/// Sign out (invalidate the current token).
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    state.profile_service.signout(&user.id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
}
