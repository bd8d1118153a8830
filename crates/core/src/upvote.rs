//! Local upvote tracking.

use std::collections::HashSet;

use civicpulse_common::{AppError, AppResult};

use crate::model::{CommunityReport, UpvoteState};

/// The current user's upvotes, kept locally.
///
/// Each toggle flips membership and updates the report's cached count and
/// flag together, so the two never disagree.
#[derive(Debug, Clone, Default)]
pub struct UpvoteTracker {
    upvoted: HashSet<String>,
}

impl UpvoteTracker {
    /// Tracker with no upvotes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker whose membership mirrors the flags of `reports`.
    #[must_use]
    pub fn from_reports(reports: &[CommunityReport]) -> Self {
        Self {
            upvoted: reports
                .iter()
                .filter(|report| report.has_user_upvoted)
                .map(|report| report.body.id.clone())
                .collect(),
        }
    }

    /// Whether the current user has upvoted `report_id`.
    #[must_use]
    pub fn has_upvoted(&self, report_id: &str) -> bool {
        self.upvoted.contains(report_id)
    }

    /// Flip the current user's upvote on `report`.
    ///
    /// A report whose flag disagrees with the tracker, or whose count would
    /// drop below zero, is rejected and left untouched.
    pub fn toggle(&mut self, report: &mut CommunityReport) -> AppResult<UpvoteState> {
        let id = report.body.id.as_str();
        let member = self.upvoted.contains(id);

        if report.has_user_upvoted != member {
            return Err(AppError::InvalidState(format!(
                "Upvote flag of report {id} is out of date"
            )));
        }

        let state = if member {
            let upvotes = report.upvotes.checked_sub(1).ok_or_else(|| {
                AppError::InvalidState(format!("Upvote count of report {id} is already zero"))
            })?;
            self.upvoted.remove(id);
            UpvoteState {
                upvotes,
                has_user_upvoted: false,
            }
        } else {
            self.upvoted.insert(id.to_string());
            UpvoteState {
                upvotes: report.upvotes.saturating_add(1),
                has_user_upvoted: true,
            }
        };

        report.apply_upvote_state(state);
        tracing::debug!(
            report_id = %report.body.id,
            upvotes = state.upvotes,
            has_user_upvoted = state.has_user_upvoted,
            "Upvote toggled"
        );
        Ok(state)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{IssueType, ReportBody, ReportStatus, Reporter};
    use chrono::Utc;

    fn report(upvotes: u32, has_user_upvoted: bool) -> CommunityReport {
        CommunityReport {
            body: ReportBody {
                id: "c1".to_string(),
                title: "Water leak".to_string(),
                description: "Pipe burst near the market".to_string(),
                issue_type: IssueType::WaterIssue,
                image_url: None,
                location: None,
                timestamp: Utc::now(),
                status: ReportStatus::Submitted,
                timeline: vec![],
            },
            reporter: Reporter {
                name: "Meera".to_string(),
                avatar: None,
            },
            upvotes,
            has_user_upvoted,
        }
    }

    #[test]
    fn test_five_six_five() {
        let mut report = report(5, false);
        let mut tracker = UpvoteTracker::new();

        let state = tracker.toggle(&mut report).unwrap();
        assert_eq!(
            state,
            UpvoteState {
                upvotes: 6,
                has_user_upvoted: true
            }
        );
        assert_eq!(report.upvotes, 6);
        assert!(tracker.has_upvoted("c1"));

        let state = tracker.toggle(&mut report).unwrap();
        assert_eq!(
            state,
            UpvoteState {
                upvotes: 5,
                has_user_upvoted: false
            }
        );
        assert!(!report.has_user_upvoted);
        assert!(!tracker.has_upvoted("c1"));
    }

    #[test]
    fn test_double_toggle_restores_state() {
        for (upvotes, upvoted) in [(0, false), (3, true), (1, true)] {
            let mut report = report(upvotes, upvoted);
            let before = report.upvote_state();
            let mut tracker = UpvoteTracker::from_reports(std::slice::from_ref(&report));

            tracker.toggle(&mut report).unwrap();
            tracker.toggle(&mut report).unwrap();

            assert_eq!(report.upvote_state(), before);
        }
    }

    #[test]
    fn test_stale_flag_rejected() {
        let mut report = report(4, true);
        let mut tracker = UpvoteTracker::new();

        let result = tracker.toggle(&mut report);

        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert_eq!(report.upvotes, 4);
        assert!(report.has_user_upvoted);
    }

    #[test]
    fn test_negative_count_rejected() {
        let mut report = report(0, true);
        let mut tracker = UpvoteTracker::from_reports(std::slice::from_ref(&report));

        let result = tracker.toggle(&mut report);

        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert_eq!(report.upvotes, 0);
        assert!(tracker.has_upvoted("c1"));
    }
}
