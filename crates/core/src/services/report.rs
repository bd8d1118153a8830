//! Report service.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, SubsecRound, Utc};
use civicpulse_common::{AppError, AppResult, IdGenerator};
use civicpulse_db::{
    entities::{profile, report, report_timeline, report_upvote},
    repositories::{ProfileRepository, ReportRepository, TimelineRepository, UpvoteRepository},
};
use sea_orm::Set;
use validator::Validate;

use crate::gateway::ReportFilters;
use crate::model::{
    CommunityReport, Location, PersonalReport, Report, ReportBody, ReportDraft, ReportStatus,
    ReportUpdate, Reporter, TimelineEntry,
};
use crate::search;
use crate::timeline::{self, Assignment, TimelineGenerator};

/// Shown when a reporter profile no longer exists.
const UNKNOWN_REPORTER: &str = "Unknown reporter";

/// Report service for business logic.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    timeline_repo: TimelineRepository,
    upvote_repo: UpvoteRepository,
    profile_repo: ProfileRepository,
    generator: Arc<Mutex<TimelineGenerator>>,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub fn new(
        report_repo: ReportRepository,
        timeline_repo: TimelineRepository,
        upvote_repo: UpvoteRepository,
        profile_repo: ProfileRepository,
    ) -> Self {
        Self {
            report_repo,
            timeline_repo,
            upvote_repo,
            profile_repo,
            generator: Arc::new(Mutex::new(TimelineGenerator::from_entropy())),
            id_gen: IdGenerator::new(),
        }
    }

    /// Replace the timeline generator (e.g. with a seeded one).
    pub fn set_timeline_generator(&mut self, generator: TimelineGenerator) {
        self.generator = Arc::new(Mutex::new(generator));
    }

    /// Create a report. The first timeline entry shares the report's timestamp.
    pub async fn create(
        &self,
        user_id: &str,
        draft: &ReportDraft,
        personal: bool,
    ) -> AppResult<Report> {
        let issue_type = draft.validated()?;
        let author = self.profile_repo.get_by_id(user_id).await?;

        let id = self.id_gen.generate();
        // The database keeps microseconds
        let now = Utc::now().trunc_subsecs(6);
        let is_anonymous = personal && draft.is_anonymous;
        let location = draft
            .location
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Failed to encode location: {e}")))?;

        let model = report::ActiveModel {
            id: Set(id.clone()),
            reporter_id: Set(user_id.to_string()),
            title: Set(draft.title.trim().to_string()),
            description: Set(draft.description.trim().to_string()),
            issue_type: Set(issue_type),
            image_url: Set(draft.image_url.clone()),
            location: Set(location),
            area: Set(draft.area().map(str::to_string)),
            status: Set(ReportStatus::Submitted),
            is_anonymous: Set(is_anonymous),
            is_personal: Set(personal),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };
        let first = timeline::initial(&id, now, is_anonymous);

        let txn = self.report_repo.begin().await?;
        let created = ReportRepository::create_on(&txn, model).await?;
        let first = TimelineRepository::create_on(&txn, entry_to_active(&id, &first)).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            report_id = %id,
            user_id = %user_id,
            personal,
            issue_type = %issue_type,
            "Report created"
        );

        let body = to_body(&created, vec![to_entry(first)])?;
        Ok(if personal {
            Report::Personal(PersonalReport { body, is_anonymous })
        } else {
            Report::Community(CommunityReport {
                body,
                reporter: reporter_of(Some(&author)),
                upvotes: 0,
                has_user_upvoted: false,
            })
        })
    }

    /// Personal reports of a user, newest first.
    pub async fn list_personal(&self, user_id: &str) -> AppResult<Vec<PersonalReport>> {
        let rows = self.report_repo.find_personal_by_reporter(user_id).await?;
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut timelines = group_timelines(self.timeline_repo.find_by_reports(&ids).await?);

        rows.into_iter()
            .map(|row| {
                let entries = timelines.remove(&row.id).unwrap_or_default();
                Ok(PersonalReport {
                    body: to_body(&row, entries)?,
                    is_anonymous: row.is_anonymous,
                })
            })
            .collect()
    }

    /// Community reports matching `filters`, newest first.
    ///
    /// `has_user_upvoted` is computed for `viewer`; it is false for everyone
    /// when there is no viewer.
    pub async fn list_community(
        &self,
        viewer: Option<&str>,
        filters: &ReportFilters,
    ) -> AppResult<Vec<CommunityReport>> {
        let rows = self.report_repo.find_community(&filters.to_query()).await?;
        self.assemble_community(rows, viewer).await
    }

    /// Community reports matching `query` and `filters`.
    pub async fn search(
        &self,
        query: &str,
        filters: &ReportFilters,
        viewer: Option<&str>,
    ) -> AppResult<Vec<CommunityReport>> {
        if query.trim().is_empty() {
            return Ok(vec![]);
        }

        let reports = self.list_community(viewer, filters).await?;
        Ok(search::search(&reports, query).into_iter().cloned().collect())
    }

    /// Get a report. Personal reports are only visible to their author.
    pub async fn get(&self, id: &str, viewer: Option<&str>) -> AppResult<Report> {
        let row = self.report_repo.get_by_id(id).await?;
        if row.is_personal && viewer != Some(row.reporter_id.as_str()) {
            return Err(AppError::ReportNotFound(id.to_string()));
        }
        self.assemble(row, viewer).await
    }

    /// Edit title, description, type or location. Owner only.
    pub async fn update(&self, id: &str, user_id: &str, input: &ReportUpdate) -> AppResult<Report> {
        input.validate()?;

        let row = self.report_repo.get_by_id(id).await?;
        ensure_owner(&row, user_id)?;

        let mut active: report::ActiveModel = row.into();
        if let Some(title) = &input.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = &input.description {
            active.description = Set(description.trim().to_string());
        }
        if let Some(issue_type) = input.issue_type {
            active.issue_type = Set(issue_type);
        }
        if let Some(location) = &input.location {
            let value = serde_json::to_value(location)
                .map_err(|e| AppError::Internal(format!("Failed to encode location: {e}")))?;
            active.location = Set(Some(value));
            active.area = Set(location.area.clone());
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.report_repo.update(active).await?;
        tracing::info!(report_id = %id, user_id = %user_id, "Report updated");

        self.assemble(updated, Some(user_id)).await
    }

    /// Delete a report. Owner only.
    pub async fn delete(&self, id: &str, user_id: &str) -> AppResult<()> {
        let row = self.report_repo.get_by_id(id).await?;
        ensure_owner(&row, user_id)?;

        self.report_repo.delete(id).await?;
        tracing::info!(report_id = %id, user_id = %user_id, "Report deleted");
        Ok(())
    }

    /// Move a report forward to `target`.
    ///
    /// Appends one timeline entry per status passed, one microsecond apart so
    /// the timeline stays strictly increasing. The entries and the new status
    /// are written in one transaction. Moving backwards or to the same status
    /// is rejected.
    pub async fn advance_status(&self, id: &str, target: ReportStatus) -> AppResult<Report> {
        let row = self.report_repo.get_by_id(id).await?;
        if target <= row.status {
            return Err(AppError::InvalidState(format!(
                "Report {id} is already {}; cannot move to {target}",
                row.status
            )));
        }

        let existing = self.timeline_repo.find_by_report(id).await?;
        let now = Utc::now().trunc_subsecs(6);
        let entries = self.next_entries(id, &existing, row.status, target, now)?;

        let from = row.status;
        let mut active: report::ActiveModel = row.into();
        active.status = Set(target);
        active.updated_at = Set(Some(now.into()));

        let txn = self.report_repo.begin().await?;
        for entry in &entries {
            TimelineRepository::create_on(&txn, entry_to_active(id, entry)).await?;
        }
        let updated = ReportRepository::update_on(&txn, active).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(report_id = %id, from = %from, to = %target, "Report status advanced");

        self.assemble(updated, None).await
    }

    /// Distinct areas with community reports.
    pub async fn areas(&self) -> AppResult<Vec<String>> {
        self.report_repo.find_areas().await
    }

    fn next_entries(
        &self,
        id: &str,
        existing: &[report_timeline::Model],
        from: ReportStatus,
        to: ReportStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<TimelineEntry>> {
        let mut assignment = existing.iter().rev().find_map(|e| {
            Some(Assignment {
                department: e.department.clone()?,
                assigned_to: e.assigned_to.clone()?,
            })
        });

        let base = existing
            .iter()
            .map(|e| e.created_at.with_timezone(&Utc) + Duration::microseconds(1))
            .fold(at, std::cmp::max);

        let mut generator = self
            .generator
            .lock()
            .map_err(|_| AppError::Internal("Timeline generator lock poisoned".to_string()))?;

        Ok(ReportStatus::ALL[from.index() + 1..=to.index()]
            .iter()
            .zip(0i64..)
            .map(|(&status, step)| {
                if status >= ReportStatus::Assigned && assignment.is_none() {
                    assignment = Some(generator.assign());
                }
                let at = base + Duration::microseconds(step);
                timeline::entry_with(id, status, at, status.index(), assignment.as_ref())
            })
            .collect())
    }

    async fn assemble(&self, row: report::Model, viewer: Option<&str>) -> AppResult<Report> {
        if row.is_personal {
            let entries = self
                .timeline_repo
                .find_by_report(&row.id)
                .await?
                .into_iter()
                .map(to_entry)
                .collect();
            return Ok(Report::Personal(PersonalReport {
                body: to_body(&row, entries)?,
                is_anonymous: row.is_anonymous,
            }));
        }

        let id = row.id.clone();
        self.assemble_community(vec![row], viewer)
            .await?
            .pop()
            .map(Report::Community)
            .ok_or(AppError::ReportNotFound(id))
    }

    async fn assemble_community(
        &self,
        rows: Vec<report::Model>,
        viewer: Option<&str>,
    ) -> AppResult<Vec<CommunityReport>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut timelines = group_timelines(self.timeline_repo.find_by_reports(&ids).await?);
        let upvotes = self.upvote_repo.find_by_reports(&ids).await?;

        let mut reporter_ids: Vec<String> = rows.iter().map(|r| r.reporter_id.clone()).collect();
        reporter_ids.sort();
        reporter_ids.dedup();
        let profiles: HashMap<String, profile::Model> = self
            .profile_repo
            .find_by_ids(&reporter_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let (counts, upvoted) = tally_upvotes(&upvotes, viewer);

        rows.into_iter()
            .map(|row| {
                let entries = timelines.remove(&row.id).unwrap_or_default();
                Ok(CommunityReport {
                    reporter: reporter_of(profiles.get(&row.reporter_id)),
                    upvotes: counts.get(row.id.as_str()).copied().unwrap_or(0),
                    has_user_upvoted: upvoted.contains(row.id.as_str()),
                    body: to_body(&row, entries)?,
                })
            })
            .collect()
    }
}

fn ensure_owner(row: &report::Model, user_id: &str) -> AppResult<()> {
    if row.reporter_id != user_id {
        return Err(AppError::Forbidden(format!(
            "Report {} belongs to another user",
            row.id
        )));
    }
    Ok(())
}

/// Upvote count per report and the reports `viewer` upvoted.
fn tally_upvotes<'a>(
    upvotes: &'a [report_upvote::Model],
    viewer: Option<&str>,
) -> (HashMap<&'a str, u32>, HashSet<&'a str>) {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    let mut upvoted = HashSet::new();
    for upvote in upvotes {
        *counts.entry(upvote.report_id.as_str()).or_default() += 1;
        if viewer == Some(upvote.user_id.as_str()) {
            upvoted.insert(upvote.report_id.as_str());
        }
    }
    (counts, upvoted)
}

fn group_timelines(rows: Vec<report_timeline::Model>) -> HashMap<String, Vec<TimelineEntry>> {
    let mut grouped: HashMap<String, Vec<TimelineEntry>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.report_id.clone())
            .or_default()
            .push(to_entry(row));
    }
    for entries in grouped.values_mut() {
        entries.sort_by_key(|e| (e.status, e.timestamp));
    }
    grouped
}

fn reporter_of(profile: Option<&profile::Model>) -> Reporter {
    profile.map_or_else(
        || Reporter {
            name: UNKNOWN_REPORTER.to_string(),
            avatar: None,
        },
        |p| Reporter {
            name: p.username.clone(),
            avatar: p.avatar_url.clone(),
        },
    )
}

fn to_entry(row: report_timeline::Model) -> TimelineEntry {
    TimelineEntry {
        id: row.id,
        status: row.status,
        timestamp: row.created_at.with_timezone(&Utc),
        description: row.description,
        assigned_to: row.assigned_to,
        department: row.department,
    }
}

fn entry_to_active(report_id: &str, entry: &TimelineEntry) -> report_timeline::ActiveModel {
    report_timeline::ActiveModel {
        id: Set(entry.id.clone()),
        report_id: Set(report_id.to_string()),
        status: Set(entry.status),
        description: Set(entry.description.clone()),
        assigned_to: Set(entry.assigned_to.clone()),
        department: Set(entry.department.clone()),
        created_at: Set(entry.timestamp.into()),
    }
}

fn to_body(row: &report::Model, timeline: Vec<TimelineEntry>) -> AppResult<ReportBody> {
    let location = row
        .location
        .clone()
        .map(serde_json::from_value::<Location>)
        .transpose()
        .map_err(|e| AppError::Internal(format!("Corrupt location on report {}: {e}", row.id)))?;

    Ok(ReportBody {
        id: row.id.clone(),
        title: row.title.clone(),
        description: row.description.clone(),
        issue_type: row.issue_type,
        image_url: row.image_url.clone(),
        location,
        timestamp: row.created_at.with_timezone(&Utc),
        status: row.status,
        timeline,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{IssueType, Location};
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult};

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 18, 10, 30, 0).unwrap()
    }

    fn profile_row(id: &str, username: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            email: format!("{id}@example.org"),
            username: username.to_string(),
            avatar_url: None,
            password_hash: "hash".to_string(),
            token: None,
            created_at: created_at().into(),
            updated_at: None,
        }
    }

    fn report_row(id: &str, reporter_id: &str, personal: bool, status: ReportStatus) -> report::Model {
        report::Model {
            id: id.to_string(),
            reporter_id: reporter_id.to_string(),
            title: "Pothole on Ring Road".to_string(),
            description: "Large pothole in the left lane".to_string(),
            issue_type: IssueType::Pothole,
            image_url: None,
            location: Some(serde_json::json!({
                "latitude": 23.67,
                "longitude": 86.15,
                "area": "Sector 4"
            })),
            area: Some("Sector 4".to_string()),
            status,
            is_anonymous: false,
            is_personal: personal,
            created_at: created_at().into(),
            updated_at: None,
        }
    }

    fn timeline_row(report_id: &str, status: ReportStatus) -> report_timeline::Model {
        report_timeline::Model {
            id: format!("{report_id}-{}", status.index()),
            report_id: report_id.to_string(),
            status,
            description: status.label().to_string(),
            assigned_to: None,
            department: None,
            created_at: created_at().into(),
        }
    }

    fn upvote_row(id: &str, report_id: &str, user_id: &str) -> report_upvote::Model {
        report_upvote::Model {
            id: id.to_string(),
            report_id: report_id.to_string(),
            user_id: user_id.to_string(),
            created_at: created_at().into(),
        }
    }

    fn service(db: DatabaseConnection) -> ReportService {
        shared_service(Arc::new(db))
    }

    fn shared_service(db: Arc<DatabaseConnection>) -> ReportService {
        let mut service = ReportService::new(
            ReportRepository::new(db.clone()),
            TimelineRepository::new(db.clone()),
            UpvoteRepository::new(db.clone()),
            ProfileRepository::new(db),
        );
        service.set_timeline_generator(TimelineGenerator::seeded(1));
        service
    }

    fn draft() -> ReportDraft {
        ReportDraft {
            title: "Pothole on Ring Road".to_string(),
            description: "Large pothole in the left lane".to_string(),
            issue_type: Some(IssueType::Pothole),
            location: Some(Location {
                latitude: 23.67,
                longitude: 86.15,
                address: None,
                area: Some("Sector 4".to_string()),
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_community_report() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[profile_row("u1", "Asha")]])
            .append_query_results([[report_row("r1", "u1", false, ReportStatus::Submitted)]])
            .append_query_results([[timeline_row("r1", ReportStatus::Submitted)]])
            .into_connection();

        let report = service(db).create("u1", &draft(), false).await.unwrap();
        let Report::Community(report) = report else {
            panic!("expected a community report");
        };

        assert_eq!(report.body.status, ReportStatus::Submitted);
        assert_eq!(report.body.timeline.len(), 1);
        assert!(report.body.timeline_is_consistent());
        assert_eq!(report.reporter.name, "Asha");
        assert_eq!(report.upvotes, 0);
        assert!(!report.has_user_upvoted);
        assert_eq!(report.body.area(), Some("Sector 4"));
    }

    /// SQL of the last transaction the mock recorded.
    fn last_transaction_sql(db: Arc<DatabaseConnection>) -> Vec<String> {
        let Ok(db) = Arc::try_unwrap(db) else {
            panic!("connection still shared");
        };
        db.into_transaction_log()
            .last()
            .unwrap()
            .statements()
            .iter()
            .map(|s| s.sql.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_create_rolls_back_when_timeline_insert_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile_row("u1", "Asha")]])
                .append_query_results([[report_row("r1", "u1", false, ReportStatus::Submitted)]])
                .append_query_errors([DbErr::Custom("timeline insert failed".to_string())])
                .into_connection(),
        );

        let result = shared_service(db.clone()).create("u1", &draft(), false).await;
        assert!(matches!(result, Err(AppError::Database(_))));

        let sql = last_transaction_sql(db);
        assert_eq!(sql.len(), 4);
        assert_eq!(sql[0], "BEGIN");
        assert!(sql[1].starts_with(r#"INSERT INTO "report""#));
        assert!(sql[2].starts_with(r#"INSERT INTO "report_timeline""#));
        assert_eq!(sql[3], "ROLLBACK");
    }

    #[tokio::test]
    async fn test_create_commits_report_and_timeline_together() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile_row("u1", "Asha")]])
                .append_query_results([[report_row("r1", "u1", true, ReportStatus::Submitted)]])
                .append_query_results([[timeline_row("r1", ReportStatus::Submitted)]])
                .into_connection(),
        );

        let result = shared_service(db.clone()).create("u1", &draft(), true).await;
        assert!(result.is_ok());

        let sql = last_transaction_sql(db);
        assert_eq!(sql.first().map(String::as_str), Some("BEGIN"));
        assert_eq!(sql.last().map(String::as_str), Some("COMMIT"));
        assert_eq!(sql.len(), 4);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft_before_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let invalid = ReportDraft {
            title: " ".to_string(),
            ..draft()
        };
        let result = service(db).create("u1", &invalid, true).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_community_computes_viewer_flag() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                report_row("r1", "u1", false, ReportStatus::Submitted),
                report_row("r2", "u2", false, ReportStatus::Submitted),
            ]])
            .append_query_results([[
                timeline_row("r1", ReportStatus::Submitted),
                timeline_row("r2", ReportStatus::Submitted),
            ]])
            .append_query_results([[
                upvote_row("v1", "r1", "u2"),
                upvote_row("v2", "r1", "u3"),
                upvote_row("v3", "r2", "u3"),
            ]])
            .append_query_results([[profile_row("u1", "Asha"), profile_row("u2", "Ravi")]])
            .into_connection();

        let reports = service(db)
            .list_community(Some("u2"), &ReportFilters::default())
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].upvotes, 2);
        assert!(reports[0].has_user_upvoted);
        assert_eq!(reports[0].reporter.name, "Asha");
        assert_eq!(reports[1].upvotes, 1);
        assert!(!reports[1].has_user_upvoted);
        assert_eq!(reports[1].reporter.name, "Ravi");
    }

    #[tokio::test]
    async fn test_get_hides_foreign_personal_report() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[report_row("r1", "u1", true, ReportStatus::Submitted)]])
            .into_connection();

        let result = service(db).get("r1", Some("u2")).await;

        assert!(matches!(result, Err(AppError::ReportNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_requires_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[report_row("r1", "u1", false, ReportStatus::Submitted)]])
            .into_connection();

        let update = ReportUpdate {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        let result = service(db).update("r1", "u2", &update).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_by_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[report_row("r1", "u1", true, ReportStatus::Submitted)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        assert!(service(db).delete("r1", "u1").await.is_ok());
    }

    #[tokio::test]
    async fn test_advance_status_rejects_backward_move() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[report_row("r1", "u1", false, ReportStatus::Assigned)]])
            .into_connection();

        let result = service(db)
            .advance_status("r1", ReportStatus::Acknowledged)
            .await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_advance_status_appends_entries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[report_row("r1", "u1", true, ReportStatus::Submitted)]])
            .append_query_results([[timeline_row("r1", ReportStatus::Submitted)]])
            .append_query_results([[timeline_row("r1", ReportStatus::Acknowledged)]])
            .append_query_results([[timeline_row("r1", ReportStatus::Assigned)]])
            .append_query_results([[report_row("r1", "u1", true, ReportStatus::Assigned)]])
            .append_query_results([[
                timeline_row("r1", ReportStatus::Submitted),
                timeline_row("r1", ReportStatus::Acknowledged),
                timeline_row("r1", ReportStatus::Assigned),
            ]])
            .into_connection();

        let report = service(db)
            .advance_status("r1", ReportStatus::Assigned)
            .await
            .unwrap();

        assert_eq!(report.status(), ReportStatus::Assigned);
        assert_eq!(report.body().timeline.len(), 3);
    }

    #[tokio::test]
    async fn test_advance_status_rolls_back_entries_when_update_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report_row("r1", "u1", false, ReportStatus::Submitted)]])
                .append_query_results([[timeline_row("r1", ReportStatus::Submitted)]])
                .append_query_results([[timeline_row("r1", ReportStatus::Acknowledged)]])
                .append_query_errors([DbErr::Custom("status update failed".to_string())])
                .into_connection(),
        );

        let result = shared_service(db.clone())
            .advance_status("r1", ReportStatus::Acknowledged)
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));

        let sql = last_transaction_sql(db);
        assert_eq!(sql[0], "BEGIN");
        assert!(sql[1].starts_with(r#"INSERT INTO "report_timeline""#));
        assert!(sql[2].starts_with(r#"UPDATE "report""#));
        assert_eq!(sql[3], "ROLLBACK");
    }

    #[test]
    fn test_next_entries_strictly_increasing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service(db);

        // An existing entry later than the requested instant pushes the new ones after it
        let mut submitted = timeline_row("r1", ReportStatus::Submitted);
        let later = created_at() + Duration::minutes(5);
        submitted.created_at = later.into();

        let entries = service
            .next_entries(
                "r1",
                &[submitted],
                ReportStatus::Submitted,
                ReportStatus::Resolved,
                created_at(),
            )
            .unwrap();

        assert_eq!(entries.len(), 4);
        assert!(entries[0].timestamp > later);
        assert!(entries.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_next_entries_reuse_assignment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service(db);

        let mut assigned = timeline_row("r1", ReportStatus::Assigned);
        assigned.department = Some("Traffic Police".to_string());
        assigned.assigned_to = Some("S. Verma".to_string());
        let existing = vec![timeline_row("r1", ReportStatus::Submitted), assigned];

        let entries = service
            .next_entries(
                "r1",
                &existing,
                ReportStatus::Assigned,
                ReportStatus::Resolved,
                created_at(),
            )
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, ReportStatus::InProgress);
        assert!(entries.iter().all(|e| e.department.as_deref() == Some("Traffic Police")));
        assert_eq!(entries[1].id, "r1-4");
    }

    #[test]
    fn test_tally_upvotes() {
        let upvotes = vec![upvote_row("v1", "r1", "u1"), upvote_row("v2", "r1", "u2")];
        let (counts, upvoted) = tally_upvotes(&upvotes, Some("u2"));
        assert_eq!(counts["r1"], 2);
        assert!(upvoted.contains("r1"));

        let (_, upvoted) = tally_upvotes(&upvotes, None);
        assert!(upvoted.is_empty());
    }
}
