//! Timeline generation.
//!
//! Builds plausible status histories for reports: each status after
//! `Submitted` lands a random number of minutes after the previous one,
//! and from `Assigned` on every entry names a department and an officer.

use std::ops::RangeInclusive;

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::model::{ReportStatus, TimelineEntry};

/// Departments and the officer each one assigns.
const ROSTER: &[(&str, &str)] = &[
    ("Public Works Department", "R. Sharma"),
    ("Electricity Board", "A. Kumar"),
    ("Sanitation Department", "P. Singh"),
    ("Water Supply Board", "M. Das"),
    ("Traffic Police", "S. Verma"),
    ("Parks and Horticulture", "N. Iyer"),
];

/// Department and officer handling a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub department: String,
    pub assigned_to: String,
}

/// Minutes between reaching the previous status and reaching `status`.
const fn offset_minutes(status: ReportStatus) -> RangeInclusive<i64> {
    match status {
        ReportStatus::Submitted => 0..=0,
        // 1-2 hours
        ReportStatus::Acknowledged => 60..=120,
        // 4-8 hours
        ReportStatus::Assigned => 240..=480,
        // 1-2 days
        ReportStatus::InProgress => 1440..=2880,
        // 2-5 days
        ReportStatus::Resolved => 2880..=7200,
    }
}

/// Generates timeline entries from an injectable random source.
#[derive(Debug, Clone)]
pub struct TimelineGenerator<R = StdRng> {
    rng: R,
}

impl TimelineGenerator<StdRng> {
    /// Deterministic generator for a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    #[must_use]
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl<R: Rng> TimelineGenerator<R> {
    /// Generator over an existing random source.
    pub const fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Draw a department and officer from the roster.
    pub fn assign(&mut self) -> Assignment {
        let (department, officer) = ROSTER[self.rng.gen_range(0..ROSTER.len())];
        Assignment {
            department: department.to_string(),
            assigned_to: officer.to_string(),
        }
    }

    /// Entries from `Submitted` through `target`, the first at `created_at`.
    pub fn generate(
        &mut self,
        report_id: &str,
        target: ReportStatus,
        created_at: DateTime<Utc>,
    ) -> Vec<TimelineEntry> {
        let mut entries = Vec::with_capacity(target.index() + 1);
        let mut at = created_at;
        let mut assignment = None;

        for &status in target.prefix() {
            at += Duration::minutes(self.rng.gen_range(offset_minutes(status)));
            if status >= ReportStatus::Assigned && assignment.is_none() {
                assignment = Some(self.assign());
            }
            entries.push(entry_with(
                report_id,
                status,
                at,
                status.index(),
                assignment.as_ref(),
            ));
        }

        entries
    }

    /// A single entry. From `Assigned` on, a fresh assignment is drawn.
    pub fn entry(
        &mut self,
        report_id: &str,
        status: ReportStatus,
        at: DateTime<Utc>,
        ordinal: usize,
    ) -> TimelineEntry {
        let assignment = (status >= ReportStatus::Assigned).then(|| self.assign());
        entry_with(report_id, status, at, ordinal, assignment.as_ref())
    }
}

/// Description of the first entry.
#[must_use]
pub const fn submitted_description(is_anonymous: bool) -> &'static str {
    if is_anonymous {
        "Report submitted anonymously"
    } else {
        "Report submitted by user"
    }
}

/// The single entry a newly created report starts with.
#[must_use]
pub fn initial(report_id: &str, created_at: DateTime<Utc>, is_anonymous: bool) -> TimelineEntry {
    TimelineEntry {
        id: entry_id(report_id, 0),
        status: ReportStatus::Submitted,
        timestamp: created_at,
        description: submitted_description(is_anonymous).to_string(),
        assigned_to: None,
        department: None,
    }
}

/// A single entry carrying an existing assignment.
#[must_use]
pub fn entry_with(
    report_id: &str,
    status: ReportStatus,
    at: DateTime<Utc>,
    ordinal: usize,
    assignment: Option<&Assignment>,
) -> TimelineEntry {
    if status == ReportStatus::Submitted {
        let mut entry = initial(report_id, at, false);
        entry.id = entry_id(report_id, ordinal);
        return entry;
    }

    let assignment = assignment.filter(|_| status >= ReportStatus::Assigned);
    let department = assignment.map(|a| a.department.as_str());
    let officer = assignment.map(|a| a.assigned_to.as_str());

    let description = match (status, department, officer) {
        (ReportStatus::Acknowledged, ..) => {
            "Report reviewed and acknowledged by the municipal office".to_string()
        }
        (ReportStatus::Assigned, Some(department), _) => format!("Assigned to {department}"),
        (ReportStatus::InProgress, _, Some(officer)) => {
            format!("Work started on site by {officer}")
        }
        (ReportStatus::Resolved, Some(department), _) => {
            format!("Issue resolved by {department}")
        }
        (status, ..) => status.label().to_string(),
    };

    TimelineEntry {
        id: entry_id(report_id, ordinal),
        status,
        timestamp: at,
        description,
        assigned_to: officer.map(str::to_string),
        department: department.map(str::to_string),
    }
}

fn entry_id(report_id: &str, ordinal: usize) -> String {
    format!("{report_id}-{ordinal}")
}
