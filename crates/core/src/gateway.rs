//! Backend gateway.
//!
//! Stores in live mode reach the backend only through [`ReportGateway`].
//! [`crate::HttpGateway`] talks to a remote API server; [`ServiceGateway`]
//! calls the services in-process.

use async_trait::async_trait;
use civicpulse_common::{AppError, AppResult};
use civicpulse_db::repositories::ReportQuery;
use serde::{Deserialize, Serialize};

use crate::model::{
    CommunityReport, IssueType, PersonalReport, Report, ReportDraft, ReportStatus, ReportUpdate,
    UpvoteState,
};
use crate::search::StatusFilter;
use crate::services::{ReportService, UpvoteService};

/// Community listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilters {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl ReportFilters {
    /// Build filters from wire values, where `"all"` means no filter.
    #[must_use]
    pub fn from_wire(
        issue_type: Option<IssueType>,
        status: Option<StatusFilter>,
        area: Option<String>,
    ) -> Self {
        Self {
            issue_type,
            status: status.and_then(StatusFilter::status),
            area: area.filter(|a| !a.is_empty() && a != "all"),
            ..Default::default()
        }
    }

    /// Repository query for these filters.
    #[must_use]
    pub fn to_query(&self) -> ReportQuery {
        ReportQuery {
            issue_type: self.issue_type,
            status: self.status,
            area: self.area.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Remote operations on reports.
///
/// Every call may fail with [`AppError::Network`] or
/// [`AppError::Unauthorized`]; callers treat both as recoverable.
#[async_trait]
pub trait ReportGateway: Send + Sync {
    /// Personal reports of `user_id`, newest first.
    async fn fetch_personal(&self, user_id: &str) -> AppResult<Vec<PersonalReport>>;

    /// Community reports matching `filters`, newest first.
    async fn fetch_community(&self, filters: &ReportFilters) -> AppResult<Vec<CommunityReport>>;

    /// Create a personal report.
    async fn create_personal(&self, draft: &ReportDraft) -> AppResult<PersonalReport>;

    /// Create a community report.
    async fn create_community(&self, draft: &ReportDraft) -> AppResult<CommunityReport>;

    /// Flip `user_id`'s upvote and return the authoritative state.
    async fn toggle_upvote(&self, report_id: &str, user_id: &str) -> AppResult<UpvoteState>;

    /// Owner edit of a report.
    async fn update_report(&self, report_id: &str, update: &ReportUpdate) -> AppResult<Report>;

    /// Owner deletion of a report.
    async fn delete_report(&self, report_id: &str) -> AppResult<()>;
}

/// In-process gateway acting as one signed-in user.
#[derive(Clone)]
pub struct ServiceGateway {
    reports: ReportService,
    upvotes: UpvoteService,
    user_id: String,
}

impl ServiceGateway {
    /// Create a gateway for `user_id`.
    #[must_use]
    pub fn new(reports: ReportService, upvotes: UpvoteService, user_id: impl Into<String>) -> Self {
        Self {
            reports,
            upvotes,
            user_id: user_id.into(),
        }
    }

    /// The user this gateway acts as.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[async_trait]
impl ReportGateway for ServiceGateway {
    async fn fetch_personal(&self, user_id: &str) -> AppResult<Vec<PersonalReport>> {
        if user_id != self.user_id {
            return Err(AppError::Forbidden(
                "Personal reports of other users are private".to_string(),
            ));
        }
        self.reports.list_personal(user_id).await
    }

    async fn fetch_community(&self, filters: &ReportFilters) -> AppResult<Vec<CommunityReport>> {
        self.reports
            .list_community(Some(&self.user_id), filters)
            .await
    }

    async fn create_personal(&self, draft: &ReportDraft) -> AppResult<PersonalReport> {
        self.reports
            .create(&self.user_id, draft, true)
            .await?
            .into_personal()
            .ok_or_else(|| AppError::Internal("Expected a personal report".to_string()))
    }

    async fn create_community(&self, draft: &ReportDraft) -> AppResult<CommunityReport> {
        self.reports
            .create(&self.user_id, draft, false)
            .await?
            .into_community()
            .ok_or_else(|| AppError::Internal("Expected a community report".to_string()))
    }

    async fn toggle_upvote(&self, report_id: &str, user_id: &str) -> AppResult<UpvoteState> {
        self.upvotes.toggle(report_id, user_id).await
    }

    async fn update_report(&self, report_id: &str, update: &ReportUpdate) -> AppResult<Report> {
        self.reports.update(report_id, &self.user_id, update).await
    }

    async fn delete_report(&self, report_id: &str) -> AppResult<()> {
        self.reports.delete(report_id, &self.user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_all_disables_filters() {
        let filters = ReportFilters::from_wire(
            Some(IssueType::Traffic),
            Some(StatusFilter::All),
            Some("all".to_string()),
        );
        assert_eq!(filters.issue_type, Some(IssueType::Traffic));
        assert!(filters.status.is_none());
        assert!(filters.area.is_none());

        let filters = ReportFilters::from_wire(
            None,
            Some(StatusFilter::Only(ReportStatus::Resolved)),
            Some("Chas".to_string()),
        );
        let query = filters.to_query();
        assert_eq!(query.status, Some(ReportStatus::Resolved));
        assert_eq!(query.area.as_deref(), Some("Chas"));
    }

    #[test]
    fn test_filters_wire_names() {
        let filters = ReportFilters {
            issue_type: Some(IssueType::WaterIssue),
            limit: Some(10),
            ..Default::default()
        };
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json, serde_json::json!({"type": "water-issue", "limit": 10}));
    }
}
