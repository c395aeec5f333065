//! Team administration: team creation and user activation.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{TeamMember, TeamWithMembers, User};
use crate::store::ReviewStore;

#[derive(Clone)]
pub struct TeamService {
    store: Arc<dyn ReviewStore>,
}

impl TeamService {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    /// Create a team together with its members.
    ///
    /// Existing users listed as members are moved into the new team.
    pub async fn create_team(
        &self,
        team_name: &str,
        members: Vec<TeamMember>,
    ) -> Result<TeamWithMembers, AppError> {
        validate_team(team_name, &members)?;

        let team = self.store.create_team(team_name, &members).await?;
        log::info!(
            "[teams] Created team {} with {} members",
            team.team_name,
            team.members.len()
        );
        Ok(team)
    }

    /// Toggle whether a user can receive new review assignments.
    ///
    /// Existing assignments are left untouched.
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, AppError> {
        let user = self.store.set_user_active(user_id, is_active).await?;
        log::info!("[teams] User {} is_active={}", user.user_id, user.is_active);
        Ok(user)
    }
}

fn validate_team(team_name: &str, members: &[TeamMember]) -> Result<(), AppError> {
    if team_name.trim().is_empty() {
        return Err(AppError::invalid_input_field(
            "team_name must not be empty",
            "team_name",
        ));
    }

    let mut seen = HashSet::new();
    for member in members {
        if member.user_id.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "user_id must not be empty",
                "members",
            ));
        }
        if !seen.insert(member.user_id.as_str()) {
            return Err(AppError::invalid_input_field(
                format!("duplicate member {}", member.user_id),
                "members",
            ));
        }
    }
    Ok(())
}
