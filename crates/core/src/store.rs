//! Client-side report stores.
//!
//! Each store owns one collection, newest first, and is mutated through
//! `&mut self`. In [`StoreMode::Mock`] every operation stays local; in
//! [`StoreMode::Live`] reads and writes go through a [`ReportGateway`].
//!
//! Reads never fail: a failed [`refresh`](PersonalReportStore::refresh)
//! keeps the previous collection and records the error. Writes propagate
//! their error and leave the collection as it was.

use std::fmt;
use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use civicpulse_common::{AppError, AppResult, IdGenerator};

use crate::gateway::{ReportFilters, ReportGateway};
use crate::model::{
    CommunityReport, IssueType, PersonalReport, ReportBody, ReportDraft, ReportStatus, Reporter,
    UpvoteState,
};
use crate::search::{self, AreaPartition, StatusFilter};
use crate::timeline;
use crate::upvote::UpvoteTracker;

/// Where a store reads and writes.
#[derive(Clone)]
pub enum StoreMode {
    /// Local state only.
    Mock,
    /// Through a backend gateway.
    Live(Arc<dyn ReportGateway>),
}

impl StoreMode {
    /// Live mode over `gateway`.
    pub fn live(gateway: impl ReportGateway + 'static) -> Self {
        Self::Live(Arc::new(gateway))
    }

    /// Whether this is [`StoreMode::Mock`].
    #[must_use]
    pub const fn is_mock(&self) -> bool {
        matches!(self, Self::Mock)
    }

    fn gateway(&self) -> Option<Arc<dyn ReportGateway>> {
        match self {
            Self::Mock => None,
            Self::Live(gateway) => Some(Arc::clone(gateway)),
        }
    }
}

impl fmt::Debug for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock => f.write_str("Mock"),
            Self::Live(_) => f.write_str("Live"),
        }
    }
}

/// Body of a report created locally in mock mode.
fn local_body(
    id_gen: &IdGenerator,
    draft: &ReportDraft,
    issue_type: IssueType,
    is_anonymous: bool,
) -> ReportBody {
    let id = id_gen.generate();
    let now = Utc::now().trunc_subsecs(6);
    let initial = timeline::initial(&id, now, is_anonymous);

    ReportBody {
        id,
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        issue_type,
        image_url: draft.image_url.clone(),
        location: draft.location.clone(),
        timestamp: now,
        status: ReportStatus::Submitted,
        timeline: vec![initial],
    }
}

/// Reports only the signed-in user sees.
#[derive(Debug)]
pub struct PersonalReportStore {
    mode: StoreMode,
    user_id: String,
    reports: Vec<PersonalReport>,
    error: Option<String>,
    loading: bool,
    id_gen: IdGenerator,
}

impl PersonalReportStore {
    /// Empty store for `user_id`.
    pub fn new(mode: StoreMode, user_id: impl Into<String>) -> Self {
        Self {
            mode,
            user_id: user_id.into(),
            reports: Vec::new(),
            error: None,
            loading: false,
            id_gen: IdGenerator::new(),
        }
    }

    /// Reports, most recently created first.
    #[must_use]
    pub fn list(&self) -> &[PersonalReport] {
        &self.reports
    }

    /// Report by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PersonalReport> {
        self.reports.iter().find(|r| r.body.id == id)
    }

    /// Replace the collection, e.g. with fixtures in mock mode.
    pub fn seed(&mut self, reports: Vec<PersonalReport>) {
        self.reports = reports;
    }

    /// Message of the last failed refresh.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a refresh is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Create a report and put it at the head of the collection.
    pub async fn add(&mut self, draft: &ReportDraft) -> AppResult<PersonalReport> {
        let issue_type = draft.validated()?;

        let report = match self.mode.gateway() {
            None => PersonalReport {
                body: local_body(&self.id_gen, draft, issue_type, draft.is_anonymous),
                is_anonymous: draft.is_anonymous,
            },
            Some(gateway) => gateway.create_personal(draft).await?,
        };

        tracing::debug!(report_id = %report.body.id, "Personal report added");
        self.reports.insert(0, report.clone());
        Ok(report)
    }

    /// Reload from the backend, keeping the current reports on failure.
    pub async fn refresh(&mut self) {
        let Some(gateway) = self.mode.gateway() else {
            self.error = None;
            return;
        };

        self.loading = true;
        match gateway.fetch_personal(&self.user_id).await {
            Ok(reports) => {
                self.reports = reports;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, error = %e, "Failed to refresh personal reports");
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }
}

/// Public reports with upvotes and area selection.
#[derive(Debug)]
pub struct CommunityReportStore {
    mode: StoreMode,
    user_id: String,
    reporter: Reporter,
    reports: Vec<CommunityReport>,
    tracker: UpvoteTracker,
    areas: Vec<String>,
    selected_area: Option<String>,
    filters: ReportFilters,
    error: Option<String>,
    loading: bool,
    id_gen: IdGenerator,
}

impl CommunityReportStore {
    /// Empty store acting as `user_id`, who is shown as `reporter` on
    /// reports created in mock mode.
    pub fn new(mode: StoreMode, user_id: impl Into<String>, reporter: Reporter) -> Self {
        Self {
            mode,
            user_id: user_id.into(),
            reporter,
            reports: Vec::new(),
            tracker: UpvoteTracker::new(),
            areas: Vec::new(),
            selected_area: None,
            filters: ReportFilters::default(),
            error: None,
            loading: false,
            id_gen: IdGenerator::new(),
        }
    }

    /// Reports, most recently created first.
    #[must_use]
    pub fn list(&self) -> &[CommunityReport] {
        &self.reports
    }

    /// Report by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CommunityReport> {
        self.reports.iter().find(|r| r.body.id == id)
    }

    /// Replace the collection, e.g. with fixtures in mock mode.
    ///
    /// The local upvote membership is rebuilt from the reports' flags.
    pub fn seed(&mut self, reports: Vec<CommunityReport>) {
        self.tracker = UpvoteTracker::from_reports(&reports);
        self.reports = reports;
        self.merge_known_areas();
    }

    /// Message of the last failed refresh.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a refresh is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Known areas, sorted.
    #[must_use]
    pub fn areas(&self) -> &[String] {
        &self.areas
    }

    /// Add areas to the known list.
    pub fn set_areas(&mut self, areas: impl IntoIterator<Item = String>) {
        self.areas.extend(areas);
        self.areas.sort();
        self.areas.dedup();
    }

    /// Area the user is looking at.
    #[must_use]
    pub fn selected_area(&self) -> Option<&str> {
        self.selected_area.as_deref()
    }

    /// Change the area the user is looking at.
    pub fn set_selected_area(&mut self, area: Option<String>) {
        self.selected_area = area;
    }

    /// Filters sent with live fetches.
    #[must_use]
    pub const fn filters(&self) -> &ReportFilters {
        &self.filters
    }

    /// Replace the filters used by the next refresh.
    pub fn set_filters(&mut self, filters: ReportFilters) {
        self.filters = filters;
    }

    /// Create a report and put it at the head of the collection.
    pub async fn add(&mut self, draft: &ReportDraft) -> AppResult<CommunityReport> {
        let issue_type = draft.validated()?;

        let report = match self.mode.gateway() {
            None => CommunityReport {
                body: local_body(&self.id_gen, draft, issue_type, false),
                reporter: self.reporter.clone(),
                upvotes: 0,
                has_user_upvoted: false,
            },
            Some(gateway) => gateway.create_community(draft).await?,
        };

        tracing::debug!(report_id = %report.body.id, "Community report added");
        if let Some(area) = report.body.area() {
            self.set_areas([area.to_string()]);
        }
        self.reports.insert(0, report.clone());
        Ok(report)
    }

    /// Reload from the backend, keeping the current reports on failure.
    pub async fn refresh(&mut self) {
        let Some(gateway) = self.mode.gateway() else {
            self.error = None;
            return;
        };

        self.loading = true;
        match gateway.fetch_community(&self.filters).await {
            Ok(reports) => {
                self.tracker = UpvoteTracker::from_reports(&reports);
                self.reports = reports;
                self.merge_known_areas();
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh community reports");
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }

    /// Flip the current user's upvote on `report_id`.
    ///
    /// In live mode the backend's returned state is applied as is.
    pub async fn toggle_upvote(&mut self, report_id: &str) -> AppResult<UpvoteState> {
        let index = self
            .reports
            .iter()
            .position(|r| r.body.id == report_id)
            .ok_or_else(|| AppError::ReportNotFound(report_id.to_string()))?;

        let Some(gateway) = self.mode.gateway() else {
            return self.tracker.toggle(&mut self.reports[index]);
        };

        let state = gateway.toggle_upvote(report_id, &self.user_id).await?;
        self.reports[index].apply_upvote_state(state);
        self.tracker = UpvoteTracker::from_reports(&self.reports);
        Ok(state)
    }

    /// Reports in `area`.
    #[must_use]
    pub fn by_area(&self, area: &str) -> Vec<&CommunityReport> {
        search::by_area(&self.reports, area)
    }

    /// Reports in the selected area, or all of them when none is selected.
    #[must_use]
    pub fn in_selected_area(&self) -> Vec<&CommunityReport> {
        match &self.selected_area {
            Some(area) => search::by_area(&self.reports, area),
            None => self.reports.iter().collect(),
        }
    }

    /// Free-text search.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&CommunityReport> {
        search::search(&self.reports, query)
    }

    /// Reports in `area` with a matching status.
    #[must_use]
    pub fn by_status(&self, area: &str, filter: StatusFilter) -> Vec<&CommunityReport> {
        search::by_status(&self.reports, area, filter)
    }

    /// Unresolved reports in `area`.
    #[must_use]
    pub fn active_in_area(&self, area: &str) -> Vec<&CommunityReport> {
        search::active_in_area(&self.reports, area)
    }

    /// Reports grouped by area.
    #[must_use]
    pub fn partition(&self) -> AreaPartition<'_> {
        search::partition_by_area(&self.reports)
    }

    fn merge_known_areas(&mut self) {
        let known = search::known_areas(&self.reports);
        self.set_areas(known);
    }
}
