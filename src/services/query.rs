//! Read-only lookups: team rosters and a reviewer's assignments.

use std::sync::Arc;

use serde::Serialize;

use crate::error::AppError;
use crate::models::{PullRequest, PullRequestSummary, TeamWithMembers};
use crate::store::ReviewStore;

/// Pull requests a user is currently assigned to review.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewAssignments {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestSummary>,
}

#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn ReviewStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    /// Team with every member, active or not.
    pub async fn get_team_roster(&self, team_name: &str) -> Result<TeamWithMembers, AppError> {
        self.store.get_team(team_name).await
    }

    pub async fn get_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        self.store.get_pull_request(pull_request_id).await
    }

    /// All pull requests listing `user_id` as a reviewer, open or merged.
    ///
    /// An unknown user simply has no assignments.
    pub async fn get_review_assignments(&self, user_id: &str) -> Result<ReviewAssignments, AppError> {
        let pull_requests = self.store.get_pull_requests_by_reviewer(user_id).await?;
        Ok(ReviewAssignments {
            user_id: user_id.to_string(),
            pull_requests,
        })
    }
}
