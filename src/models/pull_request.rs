//! Pull request model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

impl PullRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }
}

impl std::str::FromStr for PullRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            other => Err(format!("unknown pull request status: {}", other)),
        }
    }
}

impl std::fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

/// A pull request with its reviewer assignment.
///
/// Invariants: the author never appears in `assigned_reviewers`, the list
/// holds no duplicates, and a merged pull request never changes again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub pull_request_id: String,

    pub pull_request_name: String,

    /// Author's user ID.
    pub author_id: String,

    pub status: PullRequestStatus,

    /// Reviewer user IDs, at most two.
    pub assigned_reviewers: Vec<String>,

    /// Creation timestamp (Unix).
    pub created_at: i64,

    /// Merge timestamp (Unix, if merged).
    pub merged_at: Option<i64>,

    /// Optimistic concurrency token, bumped by every stored update.
    #[serde(skip)]
    pub version: i64,
}

impl PullRequest {
    /// Build a freshly opened pull request.
    pub fn open(input: NewPullRequest, reviewers: Vec<String>, created_at: i64) -> Self {
        Self {
            pull_request_id: input.pull_request_id,
            pull_request_name: input.pull_request_name,
            author_id: input.author_id,
            status: PullRequestStatus::Open,
            assigned_reviewers: reviewers,
            created_at,
            merged_at: None,
            version: 0,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|r| r == user_id)
    }

    /// Swap one reviewer for another in place, keeping the other positions.
    ///
    /// Returns false if `old` is not assigned.
    pub fn replace_reviewer(&mut self, old: &str, new: &str) -> bool {
        match self.assigned_reviewers.iter_mut().find(|r| r.as_str() == old) {
            Some(slot) => {
                *slot = new.to_string();
                true
            }
            None => false,
        }
    }

    /// Mark as merged. Returns false if it already was.
    pub fn mark_merged(&mut self, merged_at: i64) -> bool {
        if self.is_merged() {
            return false;
        }
        self.status = PullRequestStatus::Merged;
        self.merged_at = Some(merged_at);
        true
    }

    pub fn summary(&self) -> PullRequestSummary {
        PullRequestSummary {
            pull_request_id: self.pull_request_id.clone(),
            pull_request_name: self.pull_request_name.clone(),
            author_id: self.author_id.clone(),
            status: self.status.as_str().to_string(),
        }
    }
}

/// Short form of a pull request used by reviewer listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PullRequestSummary {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    /// Status: `OPEN` or `MERGED`.
    pub status: String,
}
