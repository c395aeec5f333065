//! Pull request lifecycle: creation, merge and reviewer reassignment.
//!
//! Every mutation is a fetch → validate → compute → conditional write cycle.
//! When the write loses a race (`VersionConflict`) the whole cycle runs
//! again against a fresh snapshot, so business rules are always checked
//! against the state that is actually overwritten.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{AppError, Resource};
use crate::models::{self, NewPullRequest, PullRequest};
use crate::services::selector::{ReviewerSelector, MAX_REVIEWERS};
use crate::store::ReviewStore;

/// Result of a successful reassignment.
#[derive(Debug, Clone, Serialize)]
pub struct Reassignment {
    #[serde(rename = "pr")]
    pub pull_request: PullRequest,
    /// User ID of the new reviewer.
    pub replaced_by: String,
}

/// Orchestrates pull request state changes against a [`ReviewStore`].
#[derive(Clone)]
pub struct PullRequestService {
    store: Arc<dyn ReviewStore>,
    selector: Arc<ReviewerSelector>,
    max_update_attempts: u32,
}

impl PullRequestService {
    pub fn new(
        store: Arc<dyn ReviewStore>,
        selector: Arc<ReviewerSelector>,
        max_update_attempts: u32,
    ) -> Self {
        Self {
            store,
            selector,
            max_update_attempts: max_update_attempts.max(1),
        }
    }

    /// Open a pull request and assign up to two reviewers from the author's
    /// team.
    pub async fn create_pull_request(&self, input: NewPullRequest) -> Result<PullRequest, AppError> {
        let author = self
            .store
            .get_user(&input.author_id)
            .await
            .map_err(|e| e.as_role(Resource::Author))?;

        // Candidate pool: active teammates, author excluded
        let candidates = self
            .store
            .get_active_team_members(&author.team_name, &author.user_id)
            .await?;

        let reviewers: Vec<String> = self
            .selector
            .select_reviewers(candidates, MAX_REVIEWERS)
            .into_iter()
            .map(|u| u.user_id)
            .collect();

        let pr = PullRequest::open(input, reviewers, models::now());
        self.store.create_pull_request(&pr).await?;

        log::info!(
            "[lifecycle] Created pull request {} by {} with reviewers {:?}",
            pr.pull_request_id,
            pr.author_id,
            pr.assigned_reviewers
        );
        Ok(pr)
    }

    /// Merge a pull request. Merging a merged pull request returns it as is.
    pub async fn merge_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        let mut attempt = 1;
        loop {
            match self.try_merge(pull_request_id).await {
                Err(err) if self.should_retry(&err, attempt) => attempt += 1,
                result => return result,
            }
        }
    }

    async fn try_merge(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        let mut pr = self.store.get_pull_request(pull_request_id).await?;

        // Already merged: keep the first merge time
        if !pr.mark_merged(models::now()) {
            log::debug!("[lifecycle] Pull request {} already merged", pull_request_id);
            return Ok(pr);
        }

        let merged = self.store.update_pull_request(&pr).await?;
        log::info!("[lifecycle] Merged pull request {}", pull_request_id);
        Ok(merged)
    }

    /// Replace `old_reviewer_id` with another active member of that
    /// reviewer's team.
    pub async fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment, AppError> {
        let mut attempt = 1;
        loop {
            match self.try_reassign(pull_request_id, old_reviewer_id).await {
                Err(err) if self.should_retry(&err, attempt) => attempt += 1,
                result => return result,
            }
        }
    }

    async fn try_reassign(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment, AppError> {
        let mut pr = self.store.get_pull_request(pull_request_id).await?;

        if pr.is_merged() {
            return Err(AppError::pull_request_merged(pull_request_id));
        }
        if !pr.has_reviewer(old_reviewer_id) {
            return Err(AppError::reviewer_not_assigned(pull_request_id, old_reviewer_id));
        }

        // Replacements come from the old reviewer's team, not the author's
        let old_reviewer = self
            .store
            .get_user(old_reviewer_id)
            .await
            .map_err(|e| e.as_role(Resource::Reviewer))?;

        let candidates: Vec<_> = self
            .store
            .get_active_team_members(&old_reviewer.team_name, old_reviewer_id)
            .await?
            .into_iter()
            .filter(|u| u.user_id != pr.author_id && !pr.has_reviewer(&u.user_id))
            .collect();

        let replacement = self
            .selector
            .select_replacement(&candidates)
            .ok_or_else(|| AppError::no_candidate(pull_request_id, old_reviewer_id))?;

        // In place, so the other reviewer keeps its slot
        pr.replace_reviewer(old_reviewer_id, &replacement.user_id);
        let updated = self.store.update_pull_request(&pr).await?;

        log::info!(
            "[lifecycle] Reassigned pull request {} from {} to {}",
            pull_request_id,
            old_reviewer_id,
            replacement.user_id
        );
        Ok(Reassignment {
            pull_request: updated,
            replaced_by: replacement.user_id,
        })
    }

    fn should_retry(&self, err: &AppError, attempt: u32) -> bool {
        let retry = matches!(err, AppError::VersionConflict { .. })
            && attempt < self.max_update_attempts;
        if retry {
            log::debug!("[lifecycle] {} (attempt {}), retrying", err, attempt);
        }
        retry
    }
}
