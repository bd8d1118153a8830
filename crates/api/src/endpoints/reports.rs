//! Report endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use civicpulse_common::{AppError, AppResult};
use civicpulse_core::{
    CommunityReport, IssueType, PersonalReport, Report, ReportDraft, ReportFilters, ReportStatus,
    ReportUpdate, search::StatusFilter,
};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, ApiResponse},
};

const MAX_LIMIT: u64 = 100;

// ==================== Request Types ====================

/// Community listing query. `all` disables the status and area filters.
#[derive(Debug, Default, Deserialize)]
pub struct CommunityQuery {
    #[serde(rename = "type")]
    pub issue_type: Option<IssueType>,
    pub status: Option<StatusFilter>,
    pub area: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl CommunityQuery {
    fn into_filters(self) -> ReportFilters {
        ReportFilters {
            limit: self.limit.map(|l| l.min(MAX_LIMIT)),
            offset: self.offset,
            ..ReportFilters::from_wire(self.issue_type, self.status, self.area)
        }
    }
}

/// Search query with the same filters as the community listing.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(rename = "type")]
    pub issue_type: Option<IssueType>,
    pub status: Option<StatusFilter>,
    pub area: Option<String>,
}

impl SearchQuery {
    fn filters(&self) -> ReportFilters {
        ReportFilters::from_wire(self.issue_type, self.status, self.area.clone())
    }
}

/// Status change request.
#[derive(Debug, Deserialize)]
pub struct AdvanceStatusRequest {
    pub status: ReportStatus,
}

// ==================== Handlers ====================

/// Personal reports of the signed-in user.
async fn list_personal(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<PersonalReport>>> {
    if user.id != user_id {
        return Err(AppError::Forbidden(
            "Personal reports of other users are private".to_string(),
        ));
    }

    let reports = state.report_service.list_personal(&user_id).await?;
    Ok(ApiResponse::ok(reports))
}

/// Create a personal report.
async fn create_personal(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(draft): Json<ReportDraft>,
) -> AppResult<ApiResponse<PersonalReport>> {
    let report = state
        .report_service
        .create(&user.id, &draft, true)
        .await?
        .into_personal()
        .ok_or_else(|| AppError::Internal("Expected a personal report".to_string()))?;
    Ok(ApiResponse::created(report))
}

/// Community reports, newest first.
async fn list_community(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<CommunityQuery>,
) -> AppResult<ApiResponse<Vec<CommunityReport>>> {
    let reports = state
        .report_service
        .list_community(viewer.id(), &query.into_filters())
        .await?;
    Ok(ApiResponse::ok(reports))
}

/// Create a community report.
async fn create_community(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(draft): Json<ReportDraft>,
) -> AppResult<ApiResponse<CommunityReport>> {
    let report = state
        .report_service
        .create(&user.id, &draft, false)
        .await?
        .into_community()
        .ok_or_else(|| AppError::Internal("Expected a community report".to_string()))?;
    Ok(ApiResponse::created(report))
}

/// Free-text search over community reports.
async fn search(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<CommunityReport>>> {
    let reports = state
        .report_service
        .search(&query.q, &query.filters(), viewer.id())
        .await?;
    Ok(ApiResponse::ok(reports))
}

async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Report>> {
    let report = state.report_service.get(&id, viewer.id()).await?;
    Ok(ApiResponse::ok(report))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ReportUpdate>,
) -> AppResult<ApiResponse<Report>> {
    let report = state.report_service.update(&id, &user.id, &update).await?;
    Ok(ApiResponse::ok(report))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.report_service.delete(&id, &user.id).await?;
    Ok(response::ok())
}

/// Move a report forward to `status`, recording every step in between.
async fn advance_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdvanceStatusRequest>,
) -> AppResult<ApiResponse<Report>> {
    tracing::info!(
        report_id = %id,
        user_id = %user.id,
        status = %req.status,
        "Advancing report status"
    );
    let report = state.report_service.advance_status(&id, req.status).await?;
    Ok(ApiResponse::ok(report))
}

/// Distinct areas of community reports.
async fn areas(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<String>>> {
    let areas = state.report_service.areas().await?;
    Ok(ApiResponse::ok(areas))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}/reports", get(list_personal))
        .route("/reports/personal", post(create_personal))
        .route(
            "/reports/community",
            get(list_community).post(create_community),
        )
        .route("/reports/search", get(search))
        .route("/reports/{id}", get(show).patch(update).delete(delete))
        .route("/reports/{id}/status", post(advance_status))
        .route("/areas", get(areas))
}
