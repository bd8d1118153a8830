//! Upvote service.

use civicpulse_common::{AppError, AppResult, IdGenerator};
use civicpulse_db::{
    entities::report_upvote,
    repositories::{ReportRepository, UpvoteRepository},
};
use sea_orm::Set;

use crate::model::UpvoteState;

/// Upvote service for business logic.
#[derive(Clone)]
pub struct UpvoteService {
    report_repo: ReportRepository,
    upvote_repo: UpvoteRepository,
    id_gen: IdGenerator,
}

impl UpvoteService {
    /// Create a new upvote service.
    #[must_use]
    pub const fn new(report_repo: ReportRepository, upvote_repo: UpvoteRepository) -> Self {
        Self {
            report_repo,
            upvote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Flip `user_id`'s upvote on a community report.
    ///
    /// The returned count is recounted from the upvote table, so it always
    /// equals the number of distinct upvoters.
    pub async fn toggle(&self, report_id: &str, user_id: &str) -> AppResult<UpvoteState> {
        let report = self.report_repo.get_by_id(report_id).await?;
        if report.is_personal {
            return Err(AppError::BadRequest(
                "Personal reports cannot be upvoted".to_string(),
            ));
        }

        let removed = self
            .upvote_repo
            .delete_by_report_and_user(report_id, user_id)
            .await?;

        if !removed {
            let model = report_upvote::ActiveModel {
                id: Set(self.id_gen.generate()),
                report_id: Set(report_id.to_string()),
                user_id: Set(user_id.to_string()),
                ..Default::default()
            };
            self.upvote_repo.create(model).await?;
        }

        let upvotes = self.upvote_repo.count_by_report(report_id).await?;
        let state = UpvoteState {
            upvotes: u32::try_from(upvotes).unwrap_or(u32::MAX),
            has_user_upvoted: !removed,
        };

        tracing::info!(
            report_id = %report_id,
            user_id = %user_id,
            upvotes = state.upvotes,
            has_user_upvoted = state.has_user_upvoted,
            "Upvote toggled"
        );
        Ok(state)
    }

    /// Whether `user_id` has upvoted the report.
    pub async fn has_upvoted(&self, report_id: &str, user_id: &str) -> AppResult<bool> {
        self.upvote_repo.has_upvoted(report_id, user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use civicpulse_db::entities::report::{self, IssueType, ReportStatus};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn report_row(personal: bool) -> report::Model {
        report::Model {
            id: "r1".to_string(),
            reporter_id: "u1".to_string(),
            title: "Overflowing bins".to_string(),
            description: "Not collected for three days".to_string(),
            issue_type: IssueType::Garbage,
            image_url: None,
            location: None,
            area: Some("Chas".to_string()),
            status: ReportStatus::Submitted,
            is_anonymous: false,
            is_personal: personal,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn upvote_row() -> report_upvote::Model {
        report_upvote::Model {
            id: "v1".to_string(),
            report_id: "r1".to_string(),
            user_id: "u2".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn count(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n))
        }
    }

    fn service(db: DatabaseConnection) -> UpvoteService {
        let db = Arc::new(db);
        UpvoteService::new(ReportRepository::new(db.clone()), UpvoteRepository::new(db))
    }

    #[tokio::test]
    async fn test_toggle_adds_upvote() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[report_row(false)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([[upvote_row()]])
            .append_query_results([[count(6)]])
            .into_connection();

        let state = service(db).toggle("r1", "u2").await.unwrap();

        assert_eq!(
            state,
            UpvoteState {
                upvotes: 6,
                has_user_upvoted: true
            }
        );
    }

    #[tokio::test]
    async fn test_toggle_removes_upvote() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[report_row(false)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[count(5)]])
            .into_connection();

        let state = service(db).toggle("r1", "u2").await.unwrap();

        assert_eq!(
            state,
            UpvoteState {
                upvotes: 5,
                has_user_upvoted: false
            }
        );
    }

    #[tokio::test]
    async fn test_personal_report_cannot_be_upvoted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[report_row(true)]])
            .into_connection();

        let result = service(db).toggle("r1", "u2").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
