//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user belonging to exactly one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user ID.
    pub user_id: String,

    /// Display name.
    pub username: String,

    /// Name of the owning team.
    pub team_name: String,

    /// Whether the user can receive new review assignments.
    pub is_active: bool,
}
