//! Database entities.

#![allow(missing_docs)]

pub mod profile;
pub mod report;
pub mod report_timeline;
pub mod report_upvote;

pub use profile::Entity as Profile;
pub use report::Entity as Report;
pub use report_timeline::Entity as ReportTimeline;
pub use report_upvote::Entity as ReportUpvote;
