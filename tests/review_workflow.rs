//! End-to-end review workflow against a SQLite-backed store.
//!
//! Scenarios:
//! 1. Creation picks both remaining active teammates
//! 2. Reassignment swaps one reviewer and keeps the other in place
//! 3. Reassignment with nobody left fails with no candidate
//! 4. Merge is idempotent and freezes the assignment
//! 5. Assignment lookups follow reassignments

use std::collections::HashSet;
use std::sync::Arc;

use pr_reviewer::db;
use pr_reviewer::error::{AppError, ErrorKind, Resource};
use pr_reviewer::models::{NewPullRequest, PullRequestStatus, TeamMember};
use pr_reviewer::services::{ReviewerSelector, Services};
use pr_reviewer::store::SqliteStore;
use tempfile::{tempdir, TempDir};

async fn setup(seed: u64) -> (TempDir, Services) {
    let dir = tempdir().unwrap();
    let pool = db::initialize(&dir.path().join("reviews.db"), 5)
        .await
        .unwrap();
    let services = Services::new(
        Arc::new(SqliteStore::new(pool)),
        ReviewerSelector::seeded(seed),
        3,
    );
    (dir, services)
}

fn member(id: &str, active: bool) -> TeamMember {
    TeamMember::new(id, format!("user-{}", id.to_lowercase()), active)
}

fn new_pr(id: &str, author: &str) -> NewPullRequest {
    NewPullRequest {
        pull_request_id: id.into(),
        pull_request_name: format!("Feature {}", id),
        author_id: author.into(),
    }
}

#[tokio::test]
async fn test_create_then_reassign_to_newly_active_member() {
    let (_dir, services) = setup(1).await;
    services
        .teams
        .create_team(
            "backend",
            vec![
                member("A", true),
                member("B", true),
                member("C", true),
                member("D", false),
                member("E", false),
            ],
        )
        .await
        .unwrap();

    let pr = services
        .pull_requests
        .create_pull_request(new_pr("PR-1", "A"))
        .await
        .unwrap();
    let reviewers: HashSet<&str> = pr.assigned_reviewers.iter().map(String::as_str).collect();
    assert_eq!(reviewers, HashSet::from(["B", "C"]));
    assert_eq!(pr.status, PullRequestStatus::Open);

    services.teams.set_user_active("E", true).await.unwrap();

    let position = pr.assigned_reviewers.iter().position(|r| r == "B").unwrap();
    let result = services
        .pull_requests
        .reassign_reviewer("PR-1", "B")
        .await
        .unwrap();
    assert_eq!(result.replaced_by, "E");
    assert_eq!(result.pull_request.assigned_reviewers[position], "E");
    assert!(result.pull_request.has_reviewer("C"));
    assert_eq!(result.pull_request.assigned_reviewers.len(), 2);
}

#[tokio::test]
async fn test_reassign_without_candidates() {
    let (_dir, services) = setup(2).await;
    services
        .teams
        .create_team("backend", vec![member("A", true), member("B", true)])
        .await
        .unwrap();

    let pr = services
        .pull_requests
        .create_pull_request(new_pr("PR-1", "A"))
        .await
        .unwrap();
    assert_eq!(pr.assigned_reviewers, vec!["B".to_string()]);

    let err = services
        .pull_requests
        .reassign_reviewer("PR-1", "B")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoCandidateAvailable { .. }));
    assert_eq!(err.code(), "NO_CANDIDATE");
}

#[tokio::test]
async fn test_merge_twice_keeps_first_timestamp() {
    let (_dir, services) = setup(3).await;
    services
        .teams
        .create_team(
            "backend",
            vec![member("A", true), member("B", true), member("C", true)],
        )
        .await
        .unwrap();
    services
        .pull_requests
        .create_pull_request(new_pr("PR-1", "A"))
        .await
        .unwrap();

    let first = services
        .pull_requests
        .merge_pull_request("PR-1")
        .await
        .unwrap();
    let second = services
        .pull_requests
        .merge_pull_request("PR-1")
        .await
        .unwrap();

    assert_eq!(first.status, PullRequestStatus::Merged);
    assert_eq!(first.merged_at, second.merged_at);
    assert_eq!(first.assigned_reviewers, second.assigned_reviewers);

    let err = services
        .pull_requests
        .reassign_reviewer("PR-1", "B")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PullRequestMerged { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_large_team_always_gets_two_distinct_reviewers() {
    let (_dir, services) = setup(4).await;
    let members: Vec<TeamMember> = ["A", "B", "C", "D", "E", "F"]
        .iter()
        .map(|id| member(id, true))
        .collect();
    services.teams.create_team("platform", members).await.unwrap();

    for i in 0..20 {
        let author = ["A", "C", "F"][i % 3];
        let pr = services
            .pull_requests
            .create_pull_request(new_pr(&format!("PR-{}", i), author))
            .await
            .unwrap();
        assert_eq!(pr.assigned_reviewers.len(), 2);
        assert_ne!(pr.assigned_reviewers[0], pr.assigned_reviewers[1]);
        assert!(!pr.has_reviewer(author));
    }
}

#[tokio::test]
async fn test_unknown_references() {
    let (_dir, services) = setup(5).await;
    services
        .teams
        .create_team("backend", vec![member("A", true), member("B", true)])
        .await
        .unwrap();

    let err = services
        .pull_requests
        .create_pull_request(new_pr("PR-1", "ghost"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::NotFound {
            resource: Resource::Author,
            ..
        }
    ));

    let err = services
        .pull_requests
        .merge_pull_request("PR-404")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::NotFound {
            resource: Resource::PullRequest,
            ..
        }
    ));

    let err = services.queries.get_team_roster("frontend").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_review_assignments_follow_reassignment() {
    let (_dir, services) = setup(6).await;
    services
        .teams
        .create_team(
            "backend",
            vec![
                member("A", true),
                member("B", true),
                member("C", true),
                member("E", false),
            ],
        )
        .await
        .unwrap();
    services
        .pull_requests
        .create_pull_request(new_pr("PR-1", "A"))
        .await
        .unwrap();
    services
        .pull_requests
        .create_pull_request(new_pr("PR-2", "A"))
        .await
        .unwrap();

    let before = services.queries.get_review_assignments("B").await.unwrap();
    assert_eq!(before.user_id, "B");
    assert_eq!(before.pull_requests.len(), 2);

    services.teams.set_user_active("E", true).await.unwrap();
    services
        .pull_requests
        .reassign_reviewer("PR-1", "B")
        .await
        .unwrap();

    let after = services.queries.get_review_assignments("B").await.unwrap();
    let ids: Vec<&str> = after
        .pull_requests
        .iter()
        .map(|p| p.pull_request_id.as_str())
        .collect();
    assert_eq!(ids, vec!["PR-2"]);

    let for_e = services.queries.get_review_assignments("E").await.unwrap();
    assert_eq!(for_e.pull_requests.len(), 1);
    assert_eq!(for_e.pull_requests[0].pull_request_id, "PR-1");
    assert_eq!(for_e.pull_requests[0].status, "OPEN");

    // Unknown users simply have nothing to review.
    let nobody = services.queries.get_review_assignments("ghost").await.unwrap();
    assert!(nobody.pull_requests.is_empty());
}

#[tokio::test]
async fn test_team_creation_moves_existing_users() {
    let (_dir, services) = setup(7).await;
    services
        .teams
        .create_team("backend", vec![member("A", true), member("B", true)])
        .await
        .unwrap();
    services
        .teams
        .create_team("frontend", vec![member("B", true), member("C", true)])
        .await
        .unwrap();

    let backend = services.queries.get_team_roster("backend").await.unwrap();
    let ids: Vec<&str> = backend.members.iter().map(|m| m.user_id.as_str()).collect();
    assert_eq!(ids, vec!["A"]);

    let frontend = services.queries.get_team_roster("frontend").await.unwrap();
    let ids: Vec<&str> = frontend.members.iter().map(|m| m.user_id.as_str()).collect();
    assert_eq!(ids, vec!["B", "C"]);

    let err = services
        .teams
        .create_team("frontend", vec![member("Z", true)])
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TEAM_EXISTS");

    // The rejected team must not have touched its members.
    let err = services.teams.set_user_active("Z", false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
