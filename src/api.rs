//! REST API routes.
//!
//! Each route maps onto exactly one service operation. Request bodies and
//! query strings are decoded here; domain rules live in the services.

use crate::error::{AppError, Resource};
use crate::models::{NewPullRequest, TeamMember, TeamWithMembers};
use crate::services::{Reassignment, ReviewAssignments, Services};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Shared state for the axum routes.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

// ── Error handling ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    code: &'static str,
    message: String,
}

/// Wrapper to make AppError usable as an axum error response.
pub struct ApiErr(AppError);

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AlreadyExists {
                resource: Resource::Team,
                ..
            } => StatusCode::BAD_REQUEST,
            AppError::AlreadyExists { .. }
            | AppError::PullRequestMerged { .. }
            | AppError::ReviewerNotAssigned { .. }
            | AppError::NoCandidateAvailable { .. }
            | AppError::VersionConflict { .. } => StatusCode::CONFLICT,
            AppError::InvalidInput { .. }
            | AppError::InvalidRequest { .. }
            | AppError::MissingParameter { .. } => StatusCode::BAD_REQUEST,
            AppError::Database { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Don't leak storage details to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("[api] {}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let error = ApiErrorBody {
            code: self.0.code(),
            message,
        };
        (status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_request(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::invalid_request(rejection.body_text()))
    }
}

/// Decode a JSON body, mapping rejections to `InvalidRequest`.
fn body<T: DeserializeOwned>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiErr> {
    Ok(payload?.0)
}

/// Require a non-empty body field.
fn required(value: Option<String>, field: &str) -> Result<String, ApiErr> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiErr(AppError::invalid_request(format!(
            "{} is required",
            field
        )))),
    }
}

/// Require a non-empty query parameter.
fn required_param(value: Option<String>, name: &str) -> Result<String, ApiErr> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiErr(AppError::missing_parameter(name))),
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AddTeamRequest {
    team_name: Option<String>,
    #[serde(default)]
    members: Vec<TeamMember>,
}

#[derive(Deserialize)]
struct TeamQuery {
    team_name: Option<String>,
}

#[derive(Deserialize)]
struct SetActiveRequest {
    user_id: Option<String>,
    is_active: bool,
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct CreatePullRequestRequest {
    pull_request_id: Option<String>,
    pull_request_name: Option<String>,
    author_id: Option<String>,
}

#[derive(Deserialize)]
struct MergeRequest {
    pull_request_id: Option<String>,
}

#[derive(Deserialize)]
struct ReassignRequest {
    pull_request_id: Option<String>,
    old_user_id: Option<String>,
}

// ── Route builder ────────────────────────────────────────────────────────────

/// Build all API routes.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/team/add", post(add_team))
        .route("/team/get", get(get_team))
        .route("/users/setIsActive", post(set_user_active))
        .route("/users/getReview", get(get_user_reviews))
        .route("/pullRequest/create", post(create_pull_request))
        .route("/pullRequest/merge", post(merge_pull_request))
        .route("/pullRequest/reassign", post(reassign_reviewer))
        .route("/health", get(health))
        .with_state(state)
}

// ── Team handlers ────────────────────────────────────────────────────────────

/// POST /team/add — create a team with its members.
async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<AddTeamRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let req = body(payload)?;
    let team_name = required(req.team_name, "team_name")?;

    let team = state
        .services
        .teams
        .create_team(&team_name, req.members)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "team": team }))))
}

/// GET /team/get?team_name=X — team roster.
async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<TeamWithMembers>, ApiErr> {
    let Query(params) = query?;
    let team_name = required_param(params.team_name, "team_name")?;

    let team = state.services.queries.get_team_roster(&team_name).await?;
    Ok(Json(team))
}

// ── User handlers ────────────────────────────────────────────────────────────

/// POST /users/setIsActive — toggle a user's active flag.
async fn set_user_active(
    State(state): State<AppState>,
    payload: Result<Json<SetActiveRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiErr> {
    let req = body(payload)?;
    let user_id = required(req.user_id, "user_id")?;

    let user = state
        .services
        .teams
        .set_user_active(&user_id, req.is_active)
        .await?;
    Ok(Json(json!({ "user": user })))
}

/// GET /users/getReview?user_id=X — pull requests the user reviews.
async fn get_user_reviews(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<ReviewAssignments>, ApiErr> {
    let Query(params) = query?;
    let user_id = required_param(params.user_id, "user_id")?;

    let assignments = state
        .services
        .queries
        .get_review_assignments(&user_id)
        .await?;
    Ok(Json(assignments))
}

// ── Pull request handlers ────────────────────────────────────────────────────

/// POST /pullRequest/create — open a pull request and assign reviewers.
async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let req = body(payload)?;
    let input = NewPullRequest {
        pull_request_id: required(req.pull_request_id, "pull_request_id")?,
        pull_request_name: required(req.pull_request_name, "pull_request_name")?,
        author_id: required(req.author_id, "author_id")?,
    };

    let pr = state
        .services
        .pull_requests
        .create_pull_request(input)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "pr": pr }))))
}

/// POST /pullRequest/merge — merge a pull request (idempotent).
async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiErr> {
    let req = body(payload)?;
    let pull_request_id = required(req.pull_request_id, "pull_request_id")?;

    let pr = state
        .services
        .pull_requests
        .merge_pull_request(&pull_request_id)
        .await?;
    Ok(Json(json!({ "pr": pr })))
}

/// POST /pullRequest/reassign — replace one reviewer.
async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<Reassignment>, ApiErr> {
    let req = body(payload)?;
    let pull_request_id = required(req.pull_request_id, "pull_request_id")?;
    let old_user_id = required(req.old_user_id, "old_user_id")?;

    let reassignment = state
        .services
        .pull_requests
        .reassign_reviewer(&pull_request_id, &old_user_id)
        .await?;
    Ok(Json(reassignment))
}

// ── Health ───────────────────────────────────────────────────────────────────

/// GET /health — storage liveness.
async fn health(State(state): State<AppState>) -> Response {
    match state.services.store().ping().await {
        Ok(()) => Json(json!({ "status": "ok" })).into_response(),
        Err(e) => {
            log::warn!("[api] Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "database error" })),
            )
                .into_response()
        }
    }
}
