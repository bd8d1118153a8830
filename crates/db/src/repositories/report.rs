//! Report repository.

use std::sync::Arc;

use crate::entities::{
    Report,
    report::{self, IssueType, ReportStatus},
};
use civicpulse_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

/// Filters for community report listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
    /// Only this category.
    pub issue_type: Option<IssueType>,
    /// Only this status.
    pub status: Option<ReportStatus>,
    /// Only this area.
    pub area: Option<String>,
    /// Page size.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: Option<u64>,
}

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<report::Model>> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a report by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<report::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ReportNotFound(id.to_string()))
    }

    /// Begin a transaction. Dropping it without `commit` rolls back.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        Self::create_on(self.db.as_ref(), model).await
    }

    /// Create a new report on `conn`, e.g. inside a transaction.
    pub async fn create_on<C: ConnectionTrait>(
        conn: &C,
        model: report::ActiveModel,
    ) -> AppResult<report::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a report.
    pub async fn update(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        Self::update_on(self.db.as_ref(), model).await
    }

    /// Update a report on `conn`.
    pub async fn update_on<C: ConnectionTrait>(
        conn: &C,
        model: report::ActiveModel,
    ) -> AppResult<report::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a report. Timeline and upvote rows cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Report::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Personal reports authored by a user, newest first.
    pub async fn find_personal_by_reporter(
        &self,
        reporter_id: &str,
    ) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::ReporterId.eq(reporter_id))
            .filter(report::Column::IsPersonal.eq(true))
            .order_by_desc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Community reports matching the query, newest first.
    pub async fn find_community(&self, query: &ReportQuery) -> AppResult<Vec<report::Model>> {
        let mut select = Report::find()
            .filter(report::Column::IsPersonal.eq(false))
            .order_by_desc(report::Column::CreatedAt);

        if let Some(issue_type) = query.issue_type {
            select = select.filter(report::Column::IssueType.eq(issue_type));
        }
        if let Some(status) = query.status {
            select = select.filter(report::Column::Status.eq(status));
        }
        if let Some(area) = &query.area {
            select = select.filter(report::Column::Area.eq(area.as_str()));
        }
        if let Some(offset) = query.offset {
            select = select.offset(offset);
        }
        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        select
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Distinct areas that have at least one community report, sorted.
    pub async fn find_areas(&self) -> AppResult<Vec<String>> {
        let areas = Report::find()
            .filter(report::Column::IsPersonal.eq(false))
            .filter(report::Column::Area.is_not_null())
            .select_only()
            .column(report::Column::Area)
            .distinct()
            .order_by_asc(report::Column::Area)
            .into_tuple::<Option<String>>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(areas.into_iter().flatten().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_report(id: &str, reporter_id: &str, personal: bool) -> report::Model {
        report::Model {
            id: id.to_string(),
            reporter_id: reporter_id.to_string(),
            title: "Pothole on Main St".to_string(),
            description: "Deep pothole near the bus stop".to_string(),
            issue_type: IssueType::Pothole,
            image_url: None,
            location: None,
            area: Some("Downtown".to_string()),
            status: ReportStatus::Submitted,
            is_anonymous: false,
            is_personal: personal,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_found() {
        let report = create_test_report("r1", "u1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report.clone()]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let found = repo.get_by_id("r1").await.unwrap();

        assert_eq!(found, report);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::ReportNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_find_personal_by_reporter() {
        let r1 = create_test_report("r1", "u1", true);
        let r2 = create_test_report("r2", "u1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.find_personal_by_reporter("u1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|r| r.is_personal));
    }

    #[tokio::test]
    async fn test_find_community_with_filters() {
        let report = create_test_report("r1", "u1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let query = ReportQuery {
            issue_type: Some(IssueType::Pothole),
            area: Some("Downtown".to_string()),
            limit: Some(20),
            ..Default::default()
        };
        let result = repo.find_community(&query).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].area.as_deref(), Some("Downtown"));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.delete("r1").await;

        assert!(result.is_ok());
    }
}
