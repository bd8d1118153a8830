//! Report entity.
//!
//! Personal and community reports share one table, told apart by
//! `is_personal`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Report lifecycle status.
///
/// Variants are declared in canonical order; the derived `Ord` follows it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "acknowledged")]
    Acknowledged,
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "in-progress")]
    InProgress,
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

impl ReportStatus {
    /// All statuses in progression order.
    pub const ALL: [Self; 5] = [
        Self::Submitted,
        Self::Acknowledged,
        Self::Assigned,
        Self::InProgress,
        Self::Resolved,
    ];

    /// Position in the progression, starting at 0 for `Submitted`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Submitted => 0,
            Self::Acknowledged => 1,
            Self::Assigned => 2,
            Self::InProgress => 3,
            Self::Resolved => 4,
        }
    }

    /// The status that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Submitted => Some(Self::Acknowledged),
            Self::Acknowledged => Some(Self::Assigned),
            Self::Assigned => Some(Self::InProgress),
            Self::InProgress => Some(Self::Resolved),
            Self::Resolved => None,
        }
    }

    /// Statuses from `Submitted` up to and including `self`.
    #[must_use]
    pub fn prefix(self) -> &'static [Self] {
        &Self::ALL[..=self.index()]
    }

    /// Wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Acknowledged => "acknowledged",
            Self::Assigned => "assigned",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
        }
    }

    /// Human-readable timeline label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "Report Submitted",
            Self::Acknowledged => "Acknowledged by Authority",
            Self::Assigned => "Assigned to Department",
            Self::InProgress => "Work in Progress",
            Self::Resolved => "Issue Resolved",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown report status: {s}"))
    }
}

/// Issue category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    #[sea_orm(string_value = "pothole")]
    Pothole,
    #[sea_orm(string_value = "broken-streetlight")]
    BrokenStreetlight,
    #[sea_orm(string_value = "garbage")]
    Garbage,
    #[sea_orm(string_value = "overgrown-weed")]
    OvergrownWeed,
    #[sea_orm(string_value = "water-issue")]
    WaterIssue,
    #[sea_orm(string_value = "infrastructure")]
    Infrastructure,
    #[sea_orm(string_value = "traffic")]
    Traffic,
    #[sea_orm(string_value = "animal-issue")]
    AnimalIssue,
    #[sea_orm(string_value = "encroachment")]
    Encroachment,
    #[sea_orm(string_value = "garbage-issue")]
    GarbageIssue,
}

impl IssueType {
    /// Every category.
    pub const ALL: [Self; 10] = [
        Self::Pothole,
        Self::BrokenStreetlight,
        Self::Garbage,
        Self::OvergrownWeed,
        Self::WaterIssue,
        Self::Infrastructure,
        Self::Traffic,
        Self::AnimalIssue,
        Self::Encroachment,
        Self::GarbageIssue,
    ];

    /// Wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pothole => "pothole",
            Self::BrokenStreetlight => "broken-streetlight",
            Self::Garbage => "garbage",
            Self::OvergrownWeed => "overgrown-weed",
            Self::WaterIssue => "water-issue",
            Self::Infrastructure => "infrastructure",
            Self::Traffic => "traffic",
            Self::AnimalIssue => "animal-issue",
            Self::Encroachment => "encroachment",
            Self::GarbageIssue => "garbage-issue",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown issue type: {s}"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author profile ID
    #[sea_orm(indexed)]
    pub reporter_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(column_name = "type")]
    pub issue_type: IssueType,

    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    /// `{latitude, longitude, address?, area?}`
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub location: Option<Json>,

    /// Copy of `location.area` for filtering
    #[sea_orm(nullable, indexed)]
    pub area: Option<String>,

    pub status: ReportStatus,

    #[sea_orm(default_value = false)]
    pub is_anonymous: bool,

    /// Personal reports are only listed for their author
    pub is_personal: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ReporterId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Profile,

    #[sea_orm(has_many = "super::report_timeline::Entity")]
    Timeline,

    #[sea_orm(has_many = "super::report_upvote::Entity")]
    Upvote,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::report_timeline::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Timeline.def()
    }
}

impl Related<super::report_upvote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Upvote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
