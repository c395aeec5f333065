//! In-memory implementation of `ReviewStore`.
//!
//! All state lives behind one `RwLock`, so every write (team creation with
//! its member upserts, a conditional pull request update) is atomic. All
//! state is lost on restart.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ReviewStore;
use crate::error::{AppError, Resource};
use crate::models::{PullRequest, PullRequestSummary, TeamMember, TeamWithMembers, User};

#[derive(Default)]
struct State {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    pull_requests: BTreeMap<String, PullRequest>,
}

impl State {
    fn team(&self, team_name: &str) -> Result<TeamWithMembers, AppError> {
        if !self.teams.contains(team_name) {
            return Err(AppError::not_found(Resource::Team, team_name));
        }
        let users = self
            .users
            .values()
            .filter(|u| u.team_name == team_name)
            .cloned()
            .collect();
        Ok(TeamWithMembers::from_users(team_name, users))
    }
}

/// In-memory review store.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for InMemoryStore {
    async fn create_team(
        &self,
        team_name: &str,
        members: &[TeamMember],
    ) -> Result<TeamWithMembers, AppError> {
        let mut state = self.state.write().await;
        // Same lock covers the members, so a duplicate team writes nothing
        if !state.teams.insert(team_name.to_string()) {
            return Err(AppError::already_exists(Resource::Team, team_name));
        }
        for member in members {
            state
                .users
                .insert(member.user_id.clone(), member.clone().into_user(team_name));
        }
        state.team(team_name)
    }

    async fn get_user(&self, user_id: &str) -> Result<User, AppError> {
        let state = self.state.read().await;
        state
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(Resource::User, user_id))
    }

    async fn get_team(&self, team_name: &str) -> Result<TeamWithMembers, AppError> {
        self.state.read().await.team(team_name)
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, AppError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::not_found(Resource::User, user_id))?;
        user.is_active = is_active;
        Ok(user.clone())
    }

    async fn get_active_team_members(
        &self,
        team_name: &str,
        exclude_user_id: &str,
    ) -> Result<Vec<User>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.team_name == team_name && u.is_active && u.user_id != exclude_user_id)
            .cloned()
            .collect())
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if state.pull_requests.contains_key(&pr.pull_request_id) {
            return Err(AppError::already_exists(
                Resource::PullRequest,
                &pr.pull_request_id,
            ));
        }
        state
            .pull_requests
            .insert(pr.pull_request_id.clone(), pr.clone());
        Ok(())
    }

    async fn get_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        let state = self.state.read().await;
        state
            .pull_requests
            .get(pull_request_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(Resource::PullRequest, pull_request_id))
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> Result<PullRequest, AppError> {
        let mut state = self.state.write().await;
        let stored = state
            .pull_requests
            .get_mut(&pr.pull_request_id)
            .ok_or_else(|| AppError::not_found(Resource::PullRequest, &pr.pull_request_id))?;

        // Stale snapshot
        if stored.version != pr.version {
            return Err(AppError::version_conflict(&pr.pull_request_id));
        }

        stored.status = pr.status;
        stored.assigned_reviewers = pr.assigned_reviewers.clone();
        stored.merged_at = pr.merged_at;
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn get_pull_requests_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequestSummary>, AppError> {
        let state = self.state.read().await;
        let mut prs: Vec<&PullRequest> = state
            .pull_requests
            .values()
            .filter(|pr| pr.has_reviewer(user_id))
            .collect();
        prs.sort_by(|a, b| {
            (a.created_at, &a.pull_request_id).cmp(&(b.created_at, &b.pull_request_id))
        });
        Ok(prs.into_iter().map(PullRequest::summary).collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
