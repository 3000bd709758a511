//! Team member models.

use serde::{Deserialize, Serialize};

/// Role of a user within a team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    User,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::User => "user",
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's participation in a team, identified by `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Member {
    pub user_id: String,
    pub role: MemberRole,
}

impl Member {
    pub fn new(user_id: impl Into<String>, role: MemberRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

/// A team member as reported by the upstream, which may identify users by email only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub role: MemberRole,
}

impl From<&Member> for TeamMember {
    fn from(member: &Member) -> Self {
        Self {
            user_id: Some(member.user_id.clone()),
            user_email: None,
            role: member.role,
        }
    }
}

/// Request body for adding a single member to a team.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberAddRequest {
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub member: Option<TeamMember>,
}

/// Request body for removing a member from a team.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberDeleteRequest {
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

/// Upstream body for `/team/member_add`.
#[derive(Debug, Clone, Serialize)]
pub struct MemberAddBody {
    pub team_id: String,
    pub member: TeamMember,
}

/// Upstream body for `/team/member_delete`.
#[derive(Debug, Clone, Serialize)]
pub struct MemberDeleteBody {
    pub team_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}
