//! Team models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient_f64, lenient_u64, null_default, Member, TeamMember};

/// A team as returned to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub team_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub members_with_roles: Vec<TeamMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpm_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_duration: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub models: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub blocked: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub spend: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel_requests: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_reset_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_aliases: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Team fields submitted by the create and edit forms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamPayload {
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub team_alias: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub members_with_roles: Option<Vec<Member>>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub tpm_limit: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub rpm_limit: Option<u64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max_budget: Option<f64>,
    #[serde(default)]
    pub budget_duration: Option<String>,
    #[serde(default)]
    pub models: Option<Vec<String>>,
    #[serde(default)]
    pub blocked: Option<bool>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub max_parallel_requests: Option<u64>,
    #[serde(default)]
    pub model_aliases: Option<Value>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub guardrails: Option<Value>,
}

/// Request body for editing a team.
///
/// `previous_members` is the membership the dashboard loaded before editing began.
/// When present, `members_with_roles` is reconciled against it member by member.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTeamRequest {
    #[serde(flatten)]
    pub team: TeamPayload,
    #[serde(default)]
    pub previous_members: Option<Vec<Member>>,
}

/// Request body for deleting teams.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTeamsRequest {
    #[serde(default)]
    pub team_ids: Option<Vec<String>>,
    #[serde(default)]
    pub team_id: Option<String>,
}

impl DeleteTeamsRequest {
    pub fn into_team_ids(self) -> Vec<String> {
        match (self.team_ids, self.team_id) {
            (Some(ids), _) => ids,
            (None, Some(id)) => vec![id],
            (None, None) => Vec::new(),
        }
    }
}

/// Upstream body for `/team/new` and `/team/update`.
#[derive(Debug, Clone, Serialize)]
pub struct TeamBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members_with_roles: Option<Vec<Member>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tpm_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel_requests: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_aliases: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrails: Option<Value>,
}

impl TeamBody {
    /// Body for `/team/new`. Models default to none and the team starts unblocked.
    pub fn for_create(payload: TeamPayload) -> Self {
        let mut body = Self::from_payload(payload);
        body.models = Some(body.models.unwrap_or_default());
        body.blocked = Some(body.blocked.unwrap_or(false));
        body
    }

    /// Body for `/team/update`. Fields the form left empty are not sent.
    pub fn for_update(payload: TeamPayload, include_members: bool) -> Self {
        let mut body = Self::from_payload(payload);
        if !include_members {
            body.members_with_roles = None;
        }
        body
    }

    fn from_payload(payload: TeamPayload) -> Self {
        Self {
            team_id: payload.team_id,
            team_alias: payload.team_alias,
            organization_id: payload.organization_id,
            members_with_roles: payload.members_with_roles,
            metadata: payload.metadata,
            tpm_limit: payload.tpm_limit,
            rpm_limit: payload.rpm_limit,
            max_budget: payload.max_budget,
            budget_duration: payload.budget_duration,
            models: payload.models,
            blocked: payload.blocked,
            max_parallel_requests: payload.max_parallel_requests,
            model_aliases: payload.model_aliases,
            tags: payload.tags,
            guardrails: payload.guardrails,
        }
    }
}

/// Upstream body for `/team/delete`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteTeamsBody {
    pub team_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberRole;
    use serde_json::json;

    #[test]
    fn test_create_body_defaults() {
        let payload: TeamPayload = serde_json::from_value(json!({
            "team_alias": "research",
            "max_budget": "100",
            "tpm_limit": "",
            "members_with_roles": [{ "user_id": "u1", "role": "admin" }]
        }))
        .unwrap();

        let body = serde_json::to_value(TeamBody::for_create(payload)).unwrap();
        assert_eq!(body["team_alias"], "research");
        assert_eq!(body["max_budget"], 100.0);
        assert_eq!(body["models"], json!([]));
        assert_eq!(body["blocked"], false);
        assert!(body.get("tpm_limit").is_none());
        assert_eq!(body["members_with_roles"][0]["role"], "admin");
    }

    #[test]
    fn test_update_body_can_drop_members() {
        let request: UpdateTeamRequest = serde_json::from_value(json!({
            "team_id": "t1",
            "team_alias": "research",
            "members_with_roles": [{ "user_id": "u1", "role": "user" }],
            "previous_members": []
        }))
        .unwrap();

        assert_eq!(request.previous_members, Some(vec![]));
        assert_eq!(
            request.team.members_with_roles,
            Some(vec![Member::new("u1", MemberRole::User)])
        );

        let body = serde_json::to_value(TeamBody::for_update(request.team, false)).unwrap();
        assert_eq!(body["team_id"], "t1");
        assert!(body.get("members_with_roles").is_none());
        assert!(body.get("models").is_none());
    }

    #[test]
    fn test_team_tolerates_upstream_nulls() {
        let team: Team = serde_json::from_value(json!({
            "team_id": "t1",
            "members_with_roles": null,
            "models": null,
            "spend": null,
            "blocked": null
        }))
        .unwrap();
        assert!(team.members_with_roles.is_empty());
        assert!(team.models.is_empty());
        assert_eq!(team.spend, 0.0);
        assert!(!team.blocked);
    }

    #[test]
    fn test_delete_request_accepts_single_id() {
        let request: DeleteTeamsRequest =
            serde_json::from_value(json!({ "team_id": "t1" })).unwrap();
        assert_eq!(request.into_team_ids(), vec!["t1".to_string()]);
    }
}
