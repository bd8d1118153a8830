//! Core logic for civicpulse.
//!
//! The client half ([`store`], [`gateway`], [`client`]) keeps report
//! collections in memory and talks to a backend; the backend half
//! ([`services`]) implements the same operations over the database.

pub mod client;
pub mod gateway;
pub mod mock;
pub mod model;
pub mod search;
pub mod services;
pub mod store;
pub mod timeline;
pub mod upvote;

pub use client::HttpGateway;
pub use gateway::{ReportFilters, ReportGateway, ServiceGateway};
pub use model::*;
pub use services::*;
pub use store::{CommunityReportStore, PersonalReportStore, StoreMode};
pub use timeline::TimelineGenerator;
pub use upvote::UpvoteTracker;
