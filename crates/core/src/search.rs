//! Area partitioning and search over community reports.
//!
//! Everything here is a pure view: results borrow from the input slice and
//! keep its order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::{CommunityReport, ReportStatus};

/// Status filter where `"all"` disables filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReportStatus),
}

impl StatusFilter {
    /// Whether `status` passes the filter.
    #[must_use]
    pub fn matches(self, status: ReportStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    /// The wanted status, if filtering.
    #[must_use]
    pub const fn status(self) -> Option<ReportStatus> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl Serialize for StatusFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Community reports grouped by area.
#[derive(Debug, Default)]
pub struct AreaPartition<'a> {
    pub by_area: BTreeMap<&'a str, Vec<&'a CommunityReport>>,
    /// Reports without a location or without an area.
    pub unassigned: Vec<&'a CommunityReport>,
}

impl AreaPartition<'_> {
    /// Total number of reports across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_area.values().map(Vec::len).sum::<usize>() + self.unassigned.len()
    }

    /// Whether there are no reports at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reports in `area`.
#[must_use]
pub fn by_area<'a>(reports: &'a [CommunityReport], area: &str) -> Vec<&'a CommunityReport> {
    reports
        .iter()
        .filter(|report| report.body.area() == Some(area))
        .collect()
}

/// Case-insensitive substring search.
///
/// Matches against the ID, title, description, reporter name, address,
/// area and issue type. A blank query matches nothing.
#[must_use]
pub fn search<'a>(reports: &'a [CommunityReport], query: &str) -> Vec<&'a CommunityReport> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return vec![];
    }

    reports
        .iter()
        .filter(|report| matches_query(report, &needle))
        .collect()
}

fn matches_query(report: &CommunityReport, needle: &str) -> bool {
    let body = &report.body;
    let location = body.location.as_ref();

    [
        Some(body.id.as_str()),
        Some(body.title.as_str()),
        Some(body.description.as_str()),
        Some(report.reporter.name.as_str()),
        location.and_then(|l| l.address.as_deref()),
        location.and_then(|l| l.area.as_deref()),
        Some(body.issue_type.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Reports in `area` that pass `filter`.
#[must_use]
pub fn by_status<'a>(
    reports: &'a [CommunityReport],
    area: &str,
    filter: StatusFilter,
) -> Vec<&'a CommunityReport> {
    by_area(reports, area)
        .into_iter()
        .filter(|report| filter.matches(report.body.status))
        .collect()
}

/// Unresolved reports in `area`.
#[must_use]
pub fn active_in_area<'a>(reports: &'a [CommunityReport], area: &str) -> Vec<&'a CommunityReport> {
    by_area(reports, area)
        .into_iter()
        .filter(|report| report.body.status != ReportStatus::Resolved)
        .collect()
}

/// Group every report under its area.
#[must_use]
pub fn partition_by_area(reports: &[CommunityReport]) -> AreaPartition<'_> {
    let mut partition = AreaPartition::default();
    for report in reports {
        match report.body.area() {
            Some(area) => partition.by_area.entry(area).or_default().push(report),
            None => partition.unassigned.push(report),
        }
    }
    partition
}

/// Distinct areas present in `reports`, sorted.
#[must_use]
pub fn known_areas(reports: &[CommunityReport]) -> Vec<String> {
    partition_by_area(reports)
        .by_area
        .into_keys()
        .map(str::to_string)
        .collect()
}
