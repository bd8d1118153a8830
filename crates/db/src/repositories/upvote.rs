//! Report upvote repository.

use std::sync::Arc;

use crate::entities::{ReportUpvote, report_upvote};
use civicpulse_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, SqlErr,
};

/// Upvote repository for database operations.
#[derive(Clone)]
pub struct UpvoteRepository {
    db: Arc<DatabaseConnection>,
}

impl UpvoteRepository {
    /// Create a new upvote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's upvote on a report.
    pub async fn find_by_report_and_user(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> AppResult<Option<report_upvote::Model>> {
        ReportUpvote::find()
            .filter(report_upvote::Column::ReportId.eq(report_id))
            .filter(report_upvote::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has upvoted a report.
    pub async fn has_upvoted(&self, report_id: &str, user_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_report_and_user(report_id, user_id)
            .await?
            .is_some())
    }

    /// Record an upvote.
    ///
    /// A second row for the same `(report_id, user_id)` is a `Conflict`.
    pub async fn create(&self, model: report_upvote::ActiveModel) -> AppResult<report_upvote::Model> {
        model.insert(self.db.as_ref()).await.map_err(insert_error)
    }

    /// Remove a user's upvote. Returns whether a row was deleted.
    pub async fn delete_by_report_and_user(&self, report_id: &str, user_id: &str) -> AppResult<bool> {
        let result = ReportUpvote::delete_many()
            .filter(report_upvote::Column::ReportId.eq(report_id))
            .filter(report_upvote::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Count upvotes on a report.
    pub async fn count_by_report(&self, report_id: &str) -> AppResult<u64> {
        ReportUpvote::find()
            .filter(report_upvote::Column::ReportId.eq(report_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All upvote rows of several reports.
    pub async fn find_by_reports(
        &self,
        report_ids: &[String],
    ) -> AppResult<Vec<report_upvote::Model>> {
        if report_ids.is_empty() {
            return Ok(vec![]);
        }

        ReportUpvote::find()
            .filter(report_upvote::Column::ReportId.is_in(report_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn insert_error(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Upvote already recorded, retry the toggle".to_string())
        }
        _ => AppError::Database(e.to_string()),
    }
}
