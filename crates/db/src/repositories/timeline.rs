//! Report timeline repository.

use std::sync::Arc;

use crate::entities::{ReportTimeline, report_timeline};
use civicpulse_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

/// Timeline repository for database operations.
#[derive(Clone)]
pub struct TimelineRepository {
    db: Arc<DatabaseConnection>,
}

impl TimelineRepository {
    /// Create a new timeline repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append a timeline entry on `conn`, usually the transaction that also
    /// writes the report row.
    pub async fn create_on<C: ConnectionTrait>(
        conn: &C,
        model: report_timeline::ActiveModel,
    ) -> AppResult<report_timeline::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Entries of one report in chronological order.
    pub async fn find_by_report(&self, report_id: &str) -> AppResult<Vec<report_timeline::Model>> {
        ReportTimeline::find()
            .filter(report_timeline::Column::ReportId.eq(report_id))
            .order_by_asc(report_timeline::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Entries of several reports, chronological within each report.
    pub async fn find_by_reports(
        &self,
        report_ids: &[String],
    ) -> AppResult<Vec<report_timeline::Model>> {
        if report_ids.is_empty() {
            return Ok(vec![]);
        }

        ReportTimeline::find()
            .filter(report_timeline::Column::ReportId.is_in(report_ids.iter().cloned()))
            .order_by_asc(report_timeline::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
