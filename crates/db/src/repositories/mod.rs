//! Repository layer for database operations.

mod profile;
mod report;
mod timeline;
mod upvote;

pub use profile::ProfileRepository;
pub use report::{ReportQuery, ReportRepository};
pub use timeline::TimelineRepository;
pub use upvote::UpvoteRepository;
