//! HTTP gateway tests against a canned axum server.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
};
use civicpulse_common::{AppError, config::BackendEndpoint};
use civicpulse_core::{
    CommunityReportStore, HttpGateway, IssueType, ReportFilters, ReportGateway, Reporter,
    StoreMode, mock,
};
use serde_json::json;
use tokio::net::TcpListener;

const TOKEN: &str = "session-token";
const API_KEY: &str = "anon-key";

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"));
    let key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == API_KEY);
    bearer && key
}

async fn community(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": "UNAUTHORIZED", "message": "Unauthorized"}})),
        );
    }

    let reports: Vec<_> = mock::community_reports()
        .into_iter()
        .filter(|r| {
            query
                .get("type")
                .is_none_or(|t| t.as_str() == r.body.issue_type.as_str())
        })
        .collect();
    (StatusCode::OK, Json(json!({"data": reports})))
}

async fn upvote(Path(id): Path<String>) -> impl IntoResponse {
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": "REPORT_NOT_FOUND", "message": "Report not found: missing"}})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"data": {"upvotes": 13, "hasUserUpvoted": true}})),
    )
}

async fn broken() -> impl IntoResponse {
    (StatusCode::BAD_GATEWAY, "upstream down")
}

async fn serve() -> String {
    let app = Router::new()
        .route("/api/reports/community", get(community))
        .route("/api/reports/{id}/upvote", post(upvote))
        .route("/api/reports/{id}", delete(|| async { StatusCode::NO_CONTENT }))
        .route("/api/users/{id}/reports", get(broken));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn gateway(url: String) -> HttpGateway {
    HttpGateway::new(
        &BackendEndpoint {
            url,
            api_key: API_KEY.to_string(),
        },
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_community_decodes_reports() {
    let gateway = gateway(serve().await).with_token(TOKEN);

    let reports = gateway
        .fetch_community(&ReportFilters::default())
        .await
        .unwrap();

    assert_eq!(reports, mock::community_reports());
}

#[tokio::test]
async fn test_fetch_community_sends_filters() {
    let gateway = gateway(serve().await).with_token(TOKEN);
    let filters = ReportFilters {
        issue_type: Some(IssueType::Pothole),
        ..Default::default()
    };

    let reports = gateway.fetch_community(&filters).await.unwrap();

    assert!(!reports.is_empty());
    assert!(reports.iter().all(|r| r.body.issue_type == IssueType::Pothole));
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let gateway = gateway(serve().await);

    let result = gateway.fetch_community(&ReportFilters::default()).await;

    let err = result.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_error_code_is_decoded() {
    let gateway = gateway(serve().await).with_token(TOKEN);

    let state = gateway.toggle_upvote("community_001", "u1").await.unwrap();
    assert_eq!(state.upvotes, 13);
    assert!(state.has_user_upvoted);

    let result = gateway.toggle_upvote("missing", "u1").await;
    assert!(matches!(result, Err(AppError::ReportNotFound(_))));
}

#[tokio::test]
async fn test_server_error_without_body_is_network() {
    let gateway = gateway(serve().await).with_token(TOKEN);

    let result = gateway.fetch_personal("u1").await;

    assert!(matches!(result, Err(AppError::Network(_))));
}

#[tokio::test]
async fn test_delete_accepts_empty_body() {
    let gateway = gateway(serve().await).with_token(TOKEN);

    gateway.delete_report("community_001").await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_network() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = gateway(format!("http://{addr}/api"))
        .fetch_community(&ReportFilters::default())
        .await;

    assert!(matches!(result, Err(AppError::Network(_))));
}

#[tokio::test]
async fn test_store_keeps_data_when_backend_goes_away() {
    let url = serve().await;
    let mut store = CommunityReportStore::new(
        StoreMode::live(gateway(url).with_token(TOKEN)),
        "u1",
        Reporter {
            name: "Asha".to_string(),
            avatar: None,
        },
    );
    store.refresh().await;
    assert_eq!(store.list().len(), mock::community_reports().len());

    let mut offline = CommunityReportStore::new(
        StoreMode::live(gateway("http://127.0.0.1:9/api".to_string())),
        "u1",
        Reporter {
            name: "Asha".to_string(),
            avatar: None,
        },
    );
    offline.seed(store.list().to_vec());
    offline.refresh().await;

    assert_eq!(offline.list(), store.list());
    assert!(offline.error().is_some());
    assert!(!offline.is_loading());
}
