//! SQLite implementation of `ReviewStore`.

use async_trait::async_trait;

use super::ReviewStore;
use crate::db::pool::DbPool;
use crate::db::{pull_requests, teams, users};
use crate::error::AppError;
use crate::models::{PullRequest, PullRequestSummary, TeamMember, TeamWithMembers, User};

/// Durable store backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for SqliteStore {
    async fn create_team(
        &self,
        team_name: &str,
        members: &[TeamMember],
    ) -> Result<TeamWithMembers, AppError> {
        teams::create_team(&self.pool, team_name, members).await?;
        teams::get_team(&self.pool, team_name).await
    }

    async fn get_user(&self, user_id: &str) -> Result<User, AppError> {
        users::get_user(&self.pool, user_id).await
    }

    async fn get_team(&self, team_name: &str) -> Result<TeamWithMembers, AppError> {
        teams::get_team(&self.pool, team_name).await
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, AppError> {
        users::set_user_active(&self.pool, user_id, is_active).await
    }

    async fn get_active_team_members(
        &self,
        team_name: &str,
        exclude_user_id: &str,
    ) -> Result<Vec<User>, AppError> {
        users::get_active_team_members(&self.pool, team_name, exclude_user_id).await
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), AppError> {
        pull_requests::create_pull_request(&self.pool, pr).await
    }

    async fn get_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        pull_requests::get_pull_request(&self.pool, pull_request_id).await
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> Result<PullRequest, AppError> {
        pull_requests::update_pull_request(&self.pool, pr).await
    }

    async fn get_pull_requests_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequestSummary>, AppError> {
        pull_requests::get_pull_requests_by_reviewer(&self.pool, user_id).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Resource;
    use crate::models::{NewPullRequest, PullRequestStatus};
    use tempfile::{tempdir, TempDir};

    async fn setup() -> (TempDir, SqliteStore) {
        let dir = tempdir().unwrap();
        let pool = crate::db::initialize(&dir.path().join("test.db"), 2)
            .await
            .unwrap();
        (dir, SqliteStore::new(pool))
    }

    fn members() -> Vec<TeamMember> {
        vec![
            TeamMember::new("A", "Alice", true),
            TeamMember::new("B", "Bob", true),
            TeamMember::new("C", "Carol", true),
            TeamMember::new("D", "Dave", false),
        ]
    }

    fn open_pr(id: &str, reviewers: &[&str]) -> PullRequest {
        PullRequest::open(
            NewPullRequest {
                pull_request_id: id.into(),
                pull_request_name: format!("PR {}", id),
                author_id: "A".into(),
            },
            reviewers.iter().map(|r| r.to_string()).collect(),
            1_700_000_000,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_team() {
        let (_dir, store) = setup().await;

        let team = store.create_team("backend", &members()).await.unwrap();
        assert_eq!(team.members.len(), 4);

        let fetched = store.get_team("backend").await.unwrap();
        assert_eq!(fetched, team);
    }

    #[tokio::test]
    async fn test_duplicate_team_writes_nothing() {
        let (_dir, store) = setup().await;
        store.create_team("backend", &members()).await.unwrap();

        let err = store
            .create_team("backend", &[TeamMember::new("Z", "Zed", true)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::AlreadyExists {
                resource: Resource::Team,
                ..
            }
        ));

        let err = store.get_user("Z").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_member_upsert_moves_user_between_teams() {
        let (_dir, store) = setup().await;
        store.create_team("backend", &members()).await.unwrap();
        store
            .create_team("frontend", &[TeamMember::new("B", "Bobby", false)])
            .await
            .unwrap();

        let user = store.get_user("B").await.unwrap();
        assert_eq!(user.team_name, "frontend");
        assert_eq!(user.username, "Bobby");
        assert!(!user.is_active);

        let backend = store.get_team("backend").await.unwrap();
        assert!(backend.members.iter().all(|m| m.user_id != "B"));
    }

    #[tokio::test]
    async fn test_active_team_members_excludes_inactive_and_given_user() {
        let (_dir, store) = setup().await;
        store.create_team("backend", &members()).await.unwrap();

        let users = store.get_active_team_members("backend", "A").await.unwrap();
        let ids: Vec<&str> = users.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C"]);

        store.set_user_active("D", true).await.unwrap();
        let users = store.get_active_team_members("backend", "A").await.unwrap();
        assert_eq!(users.len(), 3);
    }

    #[tokio::test]
    async fn test_set_user_active_unknown_user() {
        let (_dir, store) = setup().await;
        let err = store.set_user_active("ghost", false).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::NotFound {
                resource: Resource::User,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_pull_request_round_trip() {
        let (_dir, store) = setup().await;
        store.create_team("backend", &members()).await.unwrap();

        let pr = open_pr("1", &["B", "C"]);
        store.create_pull_request(&pr).await.unwrap();

        let fetched = store.get_pull_request("1").await.unwrap();
        assert_eq!(fetched, pr);

        let err = store.create_pull_request(&pr).await.unwrap_err();
        assert_eq!(err.code(), "PR_EXISTS");
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_rejects_stale_writes() {
        let (_dir, store) = setup().await;
        store.create_team("backend", &members()).await.unwrap();
        store.create_pull_request(&open_pr("1", &["B"])).await.unwrap();

        let snapshot = store.get_pull_request("1").await.unwrap();

        let mut merged = snapshot.clone();
        merged.mark_merged(1_700_000_100);
        let stored = store.update_pull_request(&merged).await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.status, PullRequestStatus::Merged);

        let mut stale = snapshot;
        stale.replace_reviewer("B", "C");
        let err = store.update_pull_request(&stale).await.unwrap_err();
        assert!(matches!(err, AppError::VersionConflict { .. }));

        let current = store.get_pull_request("1").await.unwrap();
        assert_eq!(current.assigned_reviewers, vec!["B".to_string()]);
        assert_eq!(current.merged_at, Some(1_700_000_100));
    }

    #[tokio::test]
    async fn test_update_missing_pull_request() {
        let (_dir, store) = setup().await;
        let err = store
            .update_pull_request(&open_pr("nope", &[]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::NotFound {
                resource: Resource::PullRequest,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_pull_requests_by_reviewer() {
        let (_dir, store) = setup().await;
        store.create_team("backend", &members()).await.unwrap();
        store.create_pull_request(&open_pr("1", &["B", "C"])).await.unwrap();
        store.create_pull_request(&open_pr("2", &["C"])).await.unwrap();
        store.create_pull_request(&open_pr("3", &[])).await.unwrap();

        let prs = store.get_pull_requests_by_reviewer("C").await.unwrap();
        let ids: Vec<&str> = prs.iter().map(|p| p.pull_request_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let prs = store.get_pull_requests_by_reviewer("B").await.unwrap();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].status, "OPEN");

        assert!(store
            .get_pull_requests_by_reviewer("nobody")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_ping() {
        let (_dir, store) = setup().await;
        store.ping().await.unwrap();
    }
}
