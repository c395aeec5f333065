//! Data models for the application.
//!
//! These models represent the entities stored by the review store and
//! returned by the services. Rows are mapped with SQLx `FromRow` where the
//! column layout matches the struct directly.

pub mod pull_request;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{NewPullRequest, PullRequest, PullRequestStatus, PullRequestSummary};
pub use team::{TeamMember, TeamWithMembers};
pub use user::User;

/// Get the current Unix timestamp.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
