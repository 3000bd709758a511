//! Team member endpoints as seen by the membership reconciler.

use serde_json::Value;

use super::UpstreamClient;
use crate::config::UpstreamSettings;
use crate::errors::AppError;
use crate::membership::MembershipApi;
use crate::models::{Member, MemberAddBody, MemberDeleteBody, TeamMember};

/// `/team/member_add` and `/team/member_delete` bound to one request's settings.
pub struct TeamMembers<'a> {
    client: &'a UpstreamClient,
    settings: &'a UpstreamSettings,
}

impl<'a> TeamMembers<'a> {
    pub fn new(client: &'a UpstreamClient, settings: &'a UpstreamSettings) -> Self {
        Self { client, settings }
    }
}

impl MembershipApi for TeamMembers<'_> {
    async fn member_add(&self, team_id: &str, member: &Member) -> Result<(), AppError> {
        let body = MemberAddBody {
            team_id: team_id.to_string(),
            member: TeamMember::from(member),
        };
        self.client
            .post::<Value, _>(self.settings, "/team/member_add", &body)
            .await?;
        Ok(())
    }

    async fn member_delete(&self, team_id: &str, user_id: &str) -> Result<(), AppError> {
        let body = MemberDeleteBody {
            team_id: team_id.to_string(),
            user_id: Some(user_id.to_string()),
            user_email: None,
        };
        self.client
            .post::<Value, _>(self.settings, "/team/member_delete", &body)
            .await?;
        Ok(())
    }
}
