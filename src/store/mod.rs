//! Storage abstraction for teams, users and pull requests.
//!
//! The services talk to a [`ReviewStore`]; implementations provide the
//! actual backend. `SqliteStore` is durable, `InMemoryStore` keeps
//! everything in process and is used by tests.
//!
//! Per-record consistency contract: `update_pull_request` only succeeds when
//! the stored version equals the version of the record passed in, and team
//! creation is all-or-nothing.

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{PullRequest, PullRequestSummary, TeamMember, TeamWithMembers, User};

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Create a team with its members. Fails with `AlreadyExists` on a
    /// duplicate name.
    async fn create_team(
        &self,
        team_name: &str,
        members: &[TeamMember],
    ) -> Result<TeamWithMembers, AppError>;

    async fn get_user(&self, user_id: &str) -> Result<User, AppError>;

    async fn get_team(&self, team_name: &str) -> Result<TeamWithMembers, AppError>;

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, AppError>;

    /// Active members of `team_name` except `exclude_user_id`, ordered by ID.
    async fn get_active_team_members(
        &self,
        team_name: &str,
        exclude_user_id: &str,
    ) -> Result<Vec<User>, AppError>;

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), AppError>;

    async fn get_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, AppError>;

    /// Conditional update keyed on `pr.version`; returns the stored record.
    async fn update_pull_request(&self, pr: &PullRequest) -> Result<PullRequest, AppError>;

    async fn get_pull_requests_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequestSummary>, AppError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
