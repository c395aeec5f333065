//! Team model.

use serde::{Deserialize, Serialize};

use super::User;

/// A team member as declared when the team is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, is_active: bool) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active,
        }
    }

    /// Attach the member to a team, producing the stored user record.
    pub fn into_user(self, team_name: &str) -> User {
        User {
            user_id: self.user_id,
            username: self.username,
            team_name: team_name.to_string(),
            is_active: self.is_active,
        }
    }
}

impl From<User> for TeamMember {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            is_active: user.is_active,
        }
    }
}

/// A team together with its roster, ordered by user ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamWithMembers {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl TeamWithMembers {
    /// Build a roster from stored users, sorting members by ID.
    pub fn from_users(team_name: impl Into<String>, users: Vec<User>) -> Self {
        let mut members: Vec<TeamMember> = users.into_iter().map(TeamMember::from).collect();
        members.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Self {
            team_name: team_name.into(),
            members,
        }
    }
}
