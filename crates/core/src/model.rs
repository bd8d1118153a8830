//! Report domain model.
//!
//! A report is either personal (visible to its author only) or community
//! (public, upvotable). Both share a [`ReportBody`]; the wire form is
//! camelCase JSON with a `kind` tag on [`Report`].

use chrono::{DateTime, Utc};
use civicpulse_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub use civicpulse_db::entities::report::{IssueType, ReportStatus};

/// Geographic position of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Partition key for community feeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}

/// One step of a report's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: String,
    pub status: ReportStatus,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// Fields shared by personal and community reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBody {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub timestamp: DateTime<Utc>,
    pub status: ReportStatus,
    pub timeline: Vec<TimelineEntry>,
}

impl ReportBody {
    /// Area of the report, if it has a location with one.
    #[must_use]
    pub fn area(&self) -> Option<&str> {
        self.location.as_ref()?.area.as_deref()
    }

    /// Whether the timeline is well formed.
    ///
    /// The first entry is `Submitted` at the report's creation time, the
    /// statuses walk the canonical progression without gaps up to
    /// `status`, and timestamps never go backwards.
    #[must_use]
    pub fn timeline_is_consistent(&self) -> bool {
        let Some(first) = self.timeline.first() else {
            return false;
        };
        if first.status != ReportStatus::Submitted || first.timestamp != self.timestamp {
            return false;
        }

        let statuses: Vec<ReportStatus> = self.timeline.iter().map(|e| e.status).collect();
        if statuses != self.status.prefix() {
            return false;
        }

        self.timeline
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }
}

/// A report only its author sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalReport {
    #[serde(flatten)]
    pub body: ReportBody,
    pub is_anonymous: bool,
}

/// Public display identity of a community report's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reporter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A public report that other users can upvote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityReport {
    #[serde(flatten)]
    pub body: ReportBody,
    pub reporter: Reporter,
    pub upvotes: u32,
    /// Whether the current viewer is among the upvoters.
    pub has_user_upvoted: bool,
}

impl CommunityReport {
    /// Current upvote state.
    #[must_use]
    pub const fn upvote_state(&self) -> UpvoteState {
        UpvoteState {
            upvotes: self.upvotes,
            has_user_upvoted: self.has_user_upvoted,
        }
    }

    /// Overwrite the cached count and flag together.
    pub const fn apply_upvote_state(&mut self, state: UpvoteState) {
        self.upvotes = state.upvotes;
        self.has_user_upvoted = state.has_user_upvoted;
    }
}

/// Any report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Report {
    Personal(PersonalReport),
    Community(CommunityReport),
}

impl Report {
    /// Shared fields.
    #[must_use]
    pub const fn body(&self) -> &ReportBody {
        match self {
            Self::Personal(r) => &r.body,
            Self::Community(r) => &r.body,
        }
    }

    /// Report ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.body().id
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> ReportStatus {
        self.body().status
    }

    /// The personal report, if this is one.
    #[must_use]
    pub fn into_personal(self) -> Option<PersonalReport> {
        match self {
            Self::Personal(r) => Some(r),
            Self::Community(_) => None,
        }
    }

    /// The community report, if this is one.
    #[must_use]
    pub fn into_community(self) -> Option<CommunityReport> {
        match self {
            Self::Community(r) => Some(r),
            Self::Personal(_) => None,
        }
    }
}

/// Upvote count and viewer membership after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteState {
    pub upvotes: u32,
    pub has_user_upvoted: bool,
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// User input for a new report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    #[validate(custom(function = "non_blank"), length(max = 256))]
    pub title: String,

    #[validate(custom(function = "non_blank"), length(max = 4000))]
    pub description: String,

    #[serde(rename = "type", default)]
    #[validate(required)]
    pub issue_type: Option<IssueType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub location: Option<Location>,

    /// Ignored for community reports.
    #[serde(default)]
    pub is_anonymous: bool,
}

impl ReportDraft {
    /// Validate the draft and return its issue type.
    pub fn validated(&self) -> AppResult<IssueType> {
        self.validate()?;
        self.issue_type
            .ok_or_else(|| AppError::Validation("type: required".to_string()))
    }

    /// Area of the draft's location.
    #[must_use]
    pub fn area(&self) -> Option<&str> {
        self.location.as_ref()?.area.as_deref()
    }
}

/// Owner edits to an existing report. Status is not editable here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "non_blank"), length(max = 256))]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "non_blank"), length(max = 4000))]
    pub description: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub location: Option<Location>,
}
