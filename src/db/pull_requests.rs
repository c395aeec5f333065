//! Pull request queries.
//!
//! Reviewer lists are stored as JSON arrays. Updates are conditional on the
//! row's `version` so two writers holding the same snapshot cannot both win.

use crate::db::pool::DbPool;
use crate::error::{AppError, Resource};
use crate::models::{PullRequest, PullRequestSummary};
use sqlx::FromRow;

/// Raw `pull_requests` row.
#[derive(Debug, FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    assigned_reviewers: String,
    created_at: i64,
    merged_at: Option<i64>,
    version: i64,
}

impl TryFrom<PullRequestRow> for PullRequest {
    type Error = AppError;

    fn try_from(row: PullRequestRow) -> Result<Self, Self::Error> {
        // Both columns are written by this module, so a parse failure is corruption
        let status = row.status.parse().map_err(AppError::internal)?;
        let assigned_reviewers: Vec<String> = serde_json::from_str(&row.assigned_reviewers)?;

        Ok(Self {
            pull_request_id: row.pull_request_id,
            pull_request_name: row.pull_request_name,
            author_id: row.author_id,
            status,
            assigned_reviewers,
            created_at: row.created_at,
            merged_at: row.merged_at,
            version: row.version,
        })
    }
}

/// Insert a new pull request.
///
/// Fails with `AlreadyExists` when the ID is taken.
pub async fn create_pull_request(pool: &DbPool, pr: &PullRequest) -> Result<(), AppError> {
    let reviewers = serde_json::to_string(&pr.assigned_reviewers)?;

    // Insert only if the ID is free
    let result = sqlx::query(
        r#"
        INSERT INTO pull_requests
            (pull_request_id, pull_request_name, author_id, status, assigned_reviewers, created_at, merged_at, version)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(pull_request_id) DO NOTHING
        "#,
    )
    .bind(&pr.pull_request_id)
    .bind(&pr.pull_request_name)
    .bind(&pr.author_id)
    .bind(pr.status.as_str())
    .bind(&reviewers)
    .bind(pr.created_at)
    .bind(pr.merged_at)
    .bind(pr.version)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::already_exists(
            Resource::PullRequest,
            &pr.pull_request_id,
        ));
    }

    Ok(())
}

/// Get a pull request by ID.
pub async fn get_pull_request(pool: &DbPool, pull_request_id: &str) -> Result<PullRequest, AppError> {
    let row = sqlx::query_as::<_, PullRequestRow>(
        r#"
        SELECT pull_request_id, pull_request_name, author_id, status,
               assigned_reviewers, created_at, merged_at, version
        FROM pull_requests
        WHERE pull_request_id = ?
        "#,
    )
    .bind(pull_request_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found(Resource::PullRequest, pull_request_id))?;

    PullRequest::try_from(row)
}

/// Write status, reviewers and merge time if the stored version still
/// matches `pr.version`.
///
/// Returns the record with its new version. Fails with `VersionConflict`
/// when another writer got there first.
pub async fn update_pull_request(pool: &DbPool, pr: &PullRequest) -> Result<PullRequest, AppError> {
    let reviewers = serde_json::to_string(&pr.assigned_reviewers)?;

    // Only matches while nobody else has bumped the version
    let result = sqlx::query(
        r#"
        UPDATE pull_requests
        SET status = ?, assigned_reviewers = ?, merged_at = ?, version = version + 1
        WHERE pull_request_id = ? AND version = ?
        "#,
    )
    .bind(pr.status.as_str())
    .bind(&reviewers)
    .bind(pr.merged_at)
    .bind(&pr.pull_request_id)
    .bind(pr.version)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        // Distinguish a vanished row from a lost race.
        get_pull_request(pool, &pr.pull_request_id).await?;
        return Err(AppError::version_conflict(&pr.pull_request_id));
    }

    // Mirror the version bump the UPDATE just applied
    Ok(PullRequest {
        version: pr.version + 1,
        ..pr.clone()
    })
}

/// All pull requests that list `user_id` as a reviewer, any status.
pub async fn get_pull_requests_by_reviewer(
    pool: &DbPool,
    user_id: &str,
) -> Result<Vec<PullRequestSummary>, AppError> {
    // Reviewer IDs live in a JSON array column; json_each expands it per row
    let prs = sqlx::query_as::<_, PullRequestSummary>(
        r#"
        SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status
        FROM pull_requests pr
        WHERE EXISTS (
            SELECT 1 FROM json_each(pr.assigned_reviewers) AS r WHERE r.value = ?
        )
        ORDER BY pr.created_at, pr.pull_request_id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(prs)
}
