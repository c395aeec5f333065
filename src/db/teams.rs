//! Team queries.

use crate::db::pool::DbPool;
use crate::error::{AppError, Resource};
use crate::models::{TeamMember, TeamWithMembers, User};

/// Create a team and upsert its members in one transaction.
///
/// Members that already exist are moved into the new team and take the
/// declared name and active flag. Nothing is written if the team exists.
pub async fn create_team(
    pool: &DbPool,
    team_name: &str,
    members: &[TeamMember],
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    // Claim the name first; a duplicate leaves the transaction to roll back on drop
    let inserted = sqlx::query(
        "INSERT INTO teams (team_name) VALUES (?) ON CONFLICT(team_name) DO NOTHING",
    )
    .bind(team_name)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(AppError::already_exists(Resource::Team, team_name));
    }

    // Upsert members, moving existing users into this team
    for member in members {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, team_name, is_active)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                team_name = excluded.team_name,
                is_active = excluded.is_active,
                updated_at = strftime('%s', 'now')
            "#,
        )
        .bind(&member.user_id)
        .bind(&member.username)
        .bind(team_name)
        .bind(member.is_active)
        .execute(&mut *tx)
        .await?;
    }

    // Commit team and members together
    tx.commit().await?;
    Ok(())
}

/// Get a team and all of its members.
pub async fn get_team(pool: &DbPool, team_name: &str) -> Result<TeamWithMembers, AppError> {
    let exists: Option<(String,)> =
        sqlx::query_as("SELECT team_name FROM teams WHERE team_name = ?")
            .bind(team_name)
            .fetch_optional(pool)
            .await?;

    // An empty team still exists, so check the teams table rather than users
    if exists.is_none() {
        return Err(AppError::not_found(Resource::Team, team_name));
    }

    let users: Vec<User> = sqlx::query_as(
        r#"
        SELECT user_id, username, team_name, is_active
        FROM users WHERE team_name = ? ORDER BY user_id
        "#,
    )
    .bind(team_name)
    .fetch_all(pool)
    .await?;

    Ok(TeamWithMembers::from_users(team_name, users))
}
