//! Application error types.
//!
//! Every failure the services can produce is a variant of [`AppError`].
//! Variants carry the kind of entity involved and its ID so callers can
//! branch on structure instead of message text. Errors serialize to a
//! tagged JSON object.

use serde::Serialize;
use thiserror::Error;

/// Kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resource {
    Team,
    User,
    /// The author of a pull request, resolved as a user.
    Author,
    /// An assigned reviewer, resolved as a user.
    Reviewer,
    PullRequest,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Team => write!(f, "team"),
            Self::User => write!(f, "user"),
            Self::Author => write!(f, "author"),
            Self::Reviewer => write!(f, "reviewer"),
            Self::PullRequest => write!(f, "pull request"),
        }
    }
}

/// Coarse classification used by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    StorageFailure,
}

/// Application-level errors.
///
/// All variants serialize to a structured JSON object.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// Requested entity does not exist.
    #[error("Not found: {resource} {id}")]
    NotFound { resource: Resource, id: String },

    /// An entity with the same key is already stored.
    #[error("Already exists: {resource} {id}")]
    AlreadyExists { resource: Resource, id: String },

    /// The pull request is merged and can no longer change.
    #[error("Pull request {id} is already merged")]
    PullRequestMerged { id: String },

    /// The user is not among the pull request's reviewers.
    #[error("Reviewer {user_id} is not assigned to pull request {pull_request_id}")]
    ReviewerNotAssigned {
        pull_request_id: String,
        user_id: String,
    },

    /// No active team member can take over the review.
    #[error("No active replacement candidate for reviewer {user_id} on pull request {pull_request_id}")]
    NoCandidateAvailable {
        pull_request_id: String,
        user_id: String,
    },

    /// A concurrent writer updated the pull request first.
    #[error("Pull request {pull_request_id} was modified concurrently")]
    VersionConflict { pull_request_id: String },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Request body could not be decoded or lacks a required field.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Required query parameter is absent or empty.
    #[error("{name} parameter is required")]
    MissingParameter { name: String },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a not found error.
    pub fn not_found(resource: Resource, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create an already exists error.
    pub fn already_exists(resource: Resource, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource,
            id: id.into(),
        }
    }

    pub fn pull_request_merged(id: impl Into<String>) -> Self {
        Self::PullRequestMerged { id: id.into() }
    }

    pub fn reviewer_not_assigned(
        pull_request_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self::ReviewerNotAssigned {
            pull_request_id: pull_request_id.into(),
            user_id: user_id.into(),
        }
    }

    pub fn no_candidate(pull_request_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::NoCandidateAvailable {
            pull_request_id: pull_request_id.into(),
            user_id: user_id.into(),
        }
    }

    pub fn version_conflict(pull_request_id: impl Into<String>) -> Self {
        Self::VersionConflict {
            pull_request_id: pull_request_id.into(),
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Create a database error with optional operation context.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: None,
        }
    }

    /// Create a database error with operation context.
    pub fn database_with_op(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: Some(operation.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classify the error for the transport layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. }
            | Self::PullRequestMerged { .. }
            | Self::ReviewerNotAssigned { .. }
            | Self::NoCandidateAvailable { .. }
            | Self::VersionConflict { .. } => ErrorKind::Conflict,
            Self::InvalidInput { .. }
            | Self::InvalidRequest { .. }
            | Self::MissingParameter { .. } => ErrorKind::InvalidInput,
            Self::Database { .. } | Self::Internal { .. } => ErrorKind::StorageFailure,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyExists {
                resource: Resource::Team,
                ..
            } => "TEAM_EXISTS",
            Self::AlreadyExists { .. } => "PR_EXISTS",
            Self::PullRequestMerged { .. } => "PR_MERGED",
            Self::ReviewerNotAssigned { .. } => "NOT_ASSIGNED",
            Self::NoCandidateAvailable { .. } => "NO_CANDIDATE",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::InvalidRequest { .. } => "INVALID_REQUEST",
            Self::MissingParameter { .. } => "MISSING_PARAMETER",
            Self::Database { .. } | Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Re-tag a user lookup failure with the role the user was resolved for.
    pub(crate) fn as_role(self, role: Resource) -> Self {
        match self {
            Self::NotFound {
                resource: Resource::User,
                id,
            } => Self::NotFound { resource: role, id },
            other => other,
        }
    }
}

// Conversions from common error types

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

/// Only database setup produces `DbError`.
impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        Self::database_with_op(err.to_string(), "initialize")
    }
}
