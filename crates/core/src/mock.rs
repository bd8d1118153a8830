//! Fixture data for stores running in mock mode.

use chrono::{DateTime, TimeZone, Utc};

use crate::model::{
    CommunityReport, IssueType, Location, PersonalReport, ReportBody, ReportStatus, Reporter,
};
use crate::timeline::{self, TimelineGenerator};

const SEED: u64 = 2025;

/// Areas shown before any report names one.
pub const AREAS: &[&str] = &[
    "Chas",
    "City Centre",
    "Sector 1",
    "Sector 4",
    "Steel City",
];

struct Fixture {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    issue_type: IssueType,
    position: (f64, f64),
    address: &'static str,
    area: Option<&'static str>,
    created: (u32, u32, u32),
    status: ReportStatus,
}

const PERSONAL: &[(Fixture, bool)] = &[
    (
        Fixture {
            id: "personal_001",
            title: "Broken Streetlight on Main Road",
            description: "The streetlight near the bus stop has been flickering for weeks and finally went out.",
            issue_type: IssueType::BrokenStreetlight,
            position: (23.6693, 86.1511),
            address: "Main Road, Near Bus Stop",
            area: Some("Sector 4"),
            created: (18, 10, 30),
            status: ReportStatus::Submitted,
        },
        false,
    ),
    (
        Fixture {
            id: "personal_002",
            title: "Garbage Collection Missed for 3 Days",
            description: "Bins in the residential block are overflowing after three skipped collections.",
            issue_type: IssueType::Garbage,
            position: (23.7958, 86.1511),
            address: "Residential Area, Steel City",
            area: Some("Steel City"),
            created: (15, 8, 45),
            status: ReportStatus::InProgress,
        },
        true,
    ),
];

const COMMUNITY: &[(Fixture, &str, u32)] = &[
    (
        Fixture {
            id: "community_001",
            title: "Large Pothole at Sector 4 Market",
            description: "A deep pothole in front of the market entrance damages two-wheelers daily.",
            issue_type: IssueType::Pothole,
            position: (23.6712, 86.1523),
            address: "Market Road, Sector 4",
            area: Some("Sector 4"),
            created: (20, 9, 15),
            status: ReportStatus::Acknowledged,
        },
        "Ravi Kumar",
        12,
    ),
    (
        Fixture {
            id: "community_002",
            title: "Water Leakage Near Chas Bus Stand",
            description: "A burst pipe has been leaking clean water onto the road for two days.",
            issue_type: IssueType::WaterIssue,
            position: (23.6345, 86.1667),
            address: "Bus Stand Road, Chas",
            area: Some("Chas"),
            created: (17, 14, 0),
            status: ReportStatus::Assigned,
        },
        "Priya Singh",
        8,
    ),
    (
        Fixture {
            id: "community_003",
            title: "Overgrown Weeds in City Park",
            description: "Weeds have covered the walking track and the children's play area.",
            issue_type: IssueType::OvergrownWeed,
            position: (23.6650, 86.1490),
            address: "City Park, City Centre",
            area: Some("City Centre"),
            created: (10, 7, 30),
            status: ReportStatus::Resolved,
        },
        "Amit Das",
        21,
    ),
    (
        Fixture {
            id: "community_004",
            title: "Traffic Signal Not Working",
            description: "The signal at the Sector 1 crossing has been blinking yellow since Monday.",
            issue_type: IssueType::Traffic,
            position: (23.6801, 86.1402),
            address: "Sector 1 Crossing",
            area: Some("Sector 1"),
            created: (19, 18, 5),
            status: ReportStatus::InProgress,
        },
        "Neha Verma",
        5,
    ),
];

fn at((day, hour, minute): (u32, u32, u32)) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

impl Fixture {
    fn body(&self, generator: &mut TimelineGenerator, is_anonymous: bool) -> ReportBody {
        let created_at = at(self.created);
        let mut entries = generator.generate(self.id, self.status, created_at);
        if let Some(first) = entries.first_mut() {
            first.description = timeline::submitted_description(is_anonymous).to_string();
        }

        ReportBody {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            issue_type: self.issue_type,
            image_url: None,
            location: Some(Location {
                latitude: self.position.0,
                longitude: self.position.1,
                address: Some(self.address.to_string()),
                area: self.area.map(str::to_string),
            }),
            timestamp: created_at,
            status: self.status,
            timeline: entries,
        }
    }
}

/// Known areas as owned strings.
#[must_use]
pub fn areas() -> Vec<String> {
    AREAS.iter().map(|a| (*a).to_string()).collect()
}

/// Personal fixtures, newest first.
#[must_use]
pub fn personal_reports() -> Vec<PersonalReport> {
    let mut generator = TimelineGenerator::seeded(SEED);
    let mut reports: Vec<PersonalReport> = PERSONAL
        .iter()
        .map(|(fixture, is_anonymous)| PersonalReport {
            body: fixture.body(&mut generator, *is_anonymous),
            is_anonymous: *is_anonymous,
        })
        .collect();
    reports.sort_by(|a, b| b.body.timestamp.cmp(&a.body.timestamp));
    reports
}

/// Community fixtures, newest first. None is upvoted by the viewer.
#[must_use]
pub fn community_reports() -> Vec<CommunityReport> {
    let mut generator = TimelineGenerator::seeded(SEED.wrapping_add(1));
    let mut reports: Vec<CommunityReport> = COMMUNITY
        .iter()
        .map(|(fixture, reporter, upvotes)| CommunityReport {
            body: fixture.body(&mut generator, false),
            reporter: Reporter {
                name: (*reporter).to_string(),
                avatar: None,
            },
            upvotes: *upvotes,
            has_user_upvoted: false,
        })
        .collect();
    reports.sort_by(|a, b| b.body.timestamp.cmp(&a.body.timestamp));
    reports
}
