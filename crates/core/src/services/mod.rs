//! Backend services.

#![allow(missing_docs)]

pub mod profile;
pub mod report;
pub mod upvote;

pub use profile::{ProfileService, Session, SigninInput, SignupInput};
pub use report::ReportService;
pub use upvote::UpvoteService;
