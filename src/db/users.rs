//! User queries.

use crate::db::pool::DbPool;
use crate::error::{AppError, Resource};
use crate::models::User;

/// Get a user by ID.
pub async fn get_user(pool: &DbPool, user_id: &str) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found(Resource::User, user_id))
}

/// Set a user's active flag and return the updated record.
pub async fn set_user_active(
    pool: &DbPool,
    user_id: &str,
    is_active: bool,
) -> Result<User, AppError> {
    // RETURNING gives back the row in the same statement; no row means unknown user
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET is_active = ?, updated_at = strftime('%s', 'now')
        WHERE user_id = ?
        RETURNING user_id, username, team_name, is_active
        "#,
    )
    .bind(is_active)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found(Resource::User, user_id))
}

/// Active members of a team other than `exclude_user_id`, ordered by user ID.
pub async fn get_active_team_members(
    pool: &DbPool,
    team_name: &str,
    exclude_user_id: &str,
) -> Result<Vec<User>, AppError> {
    // Deterministic order so seeded selection is reproducible
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, username, team_name, is_active
        FROM users
        WHERE team_name = ? AND is_active = 1 AND user_id != ?
        ORDER BY user_id
        "#,
    )
    .bind(team_name)
    .bind(exclude_user_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}
