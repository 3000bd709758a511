//! Team API endpoints.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use serde_json::Value;

use super::{error, failure, required, success, upstream_settings, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::membership::{self, MemberMutation};
use crate::models::{
    DeleteTeamsBody, DeleteTeamsRequest, MemberAddBody, MemberAddRequest, MemberDeleteBody,
    MemberDeleteRequest, Team, TeamBody, TeamMember, TeamPayload, UpdateTeamRequest,
};
use crate::upstream::TeamMembers;
use crate::validation::{validate_members, validate_team};
use crate::AppState;

/// Team returned from an edit, with the member changes that were applied.
#[derive(Debug, Serialize)]
pub struct UpdateTeamResponse {
    #[serde(flatten)]
    pub team: Team,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_changes: Option<Vec<MemberMutation>>,
}

/// GET /api/teams/list - List all teams.
pub async fn list_teams(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    let settings = upstream_settings(&state, &headers).await;

    if !settings.is_configured() {
        tracing::debug!("Upstream not configured, returning no teams");
        return success(Value::Array(Vec::new()));
    }

    match state.upstream.get::<Value>(&settings, "/team/list").await {
        Ok(teams) => success(teams),
        Err(e) => error("Failed to fetch teams", e),
    }
}

/// POST /api/teams/create - Create a new team.
pub async fn create_team(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<TeamPayload>,
) -> ApiResult<Team> {
    const CONTEXT: &str = "Failed to create team";

    if let Err(e) = validate_team(&payload) {
        return error(CONTEXT, e);
    }

    let settings = upstream_settings(&state, &headers).await;
    let body = TeamBody::for_create(payload);

    match state.upstream.post::<Team, _>(&settings, "/team/new", &body).await {
        Ok(team) => {
            tracing::info!("Created team {}", team.team_id);
            success(team)
        }
        Err(e) => error(CONTEXT, e),
    }
}

/// POST /api/teams/update - Update a team and reconcile its members.
///
/// When the request carries `previous_members`, `members_with_roles` is applied as
/// individual member additions and removals after the team fields are saved, and
/// the returned team lists the reconciled members. Without it the member list is
/// sent to the upstream as part of the update.
pub async fn update_team(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<UpdateTeamRequest>,
) -> ApiResult<UpdateTeamResponse> {
    const CONTEXT: &str = "Failed to update team";
    let fail = failure(CONTEXT);

    let UpdateTeamRequest {
        team: payload,
        previous_members,
    } = request;

    let team_id = required(payload.team_id.clone(), "Missing team_id in request body")
        .map_err(&fail)?;
    validate_team(&payload).map_err(&fail)?;

    let settings = upstream_settings(&state, &headers).await;

    let diff = match (&previous_members, &payload.members_with_roles) {
        (Some(previous), Some(desired)) => {
            validate_members(previous).map_err(&fail)?;
            Some(membership::diff(previous, desired))
        }
        _ => None,
    };
    let reconciled: Option<Vec<TeamMember>> = diff.as_ref().and_then(|_| {
        payload
            .members_with_roles
            .as_ref()
            .map(|desired| desired.iter().map(TeamMember::from).collect())
    });

    let body = TeamBody::for_update(
        TeamPayload {
            team_id: Some(team_id.clone()),
            ..payload
        },
        diff.is_none(),
    );
    let mut team: Team = state
        .upstream
        .post(&settings, "/team/update", &body)
        .await
        .map_err(&fail)?;

    let membership_changes = match diff {
        Some(diff) if !diff.is_empty() => {
            tracing::info!(
                "Reconciling team {}: {} to add, {} to remove, {} role changes",
                team_id,
                diff.to_add.len(),
                diff.to_remove.len(),
                diff.to_update_role.len()
            );
            let api = TeamMembers::new(&state.upstream, &settings);
            let applied = membership::apply(&api, &team_id, &diff)
                .await
                .map_err(|stopped| fail(stopped.into_app_error()))?;
            Some(applied)
        }
        Some(_) => Some(Vec::new()),
        None => None,
    };
    if let Some(members) = reconciled {
        team.members_with_roles = members;
    }

    success(UpdateTeamResponse {
        team,
        membership_changes,
    })
}

/// POST /api/teams/delete - Delete one or more teams.
pub async fn delete_teams(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<DeleteTeamsRequest>,
) -> ApiResult<Value> {
    const CONTEXT: &str = "Failed to delete team";

    let team_ids = request.into_team_ids();
    if team_ids.is_empty() {
        return error(
            CONTEXT,
            AppError::Validation("team_ids or team_id is required".to_string()),
        );
    }

    let settings = upstream_settings(&state, &headers).await;
    let body = DeleteTeamsBody { team_ids };

    match state.upstream.post::<Value, _>(&settings, "/team/delete", &body).await {
        Ok(data) => {
            tracing::info!("Deleted teams {:?}", body.team_ids);
            success(data)
        }
        Err(e) => error(CONTEXT, e),
    }
}

/// POST /api/teams/member_add - Add a single member to a team.
pub async fn add_team_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<MemberAddRequest>,
) -> ApiResult<Value> {
    const CONTEXT: &str = "Failed to add team member";
    let fail = failure(CONTEXT);

    let team_id = required(request.team_id, "Missing team_id in request body").map_err(&fail)?;
    let member = request
        .member
        .filter(|m| m.user_id.is_some() || m.user_email.is_some())
        .ok_or_else(|| AppError::Validation("Missing member in request body".to_string()))
        .map_err(&fail)?;

    let settings = upstream_settings(&state, &headers).await;
    let body = MemberAddBody { team_id, member };

    state
        .upstream
        .post::<Value, _>(&settings, "/team/member_add", &body)
        .await
        .map(Json)
        .map_err(fail)
}

/// POST /api/teams/member_delete - Remove a member from a team.
pub async fn delete_team_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<MemberDeleteRequest>,
) -> ApiResult<Value> {
    const CONTEXT: &str = "Failed to remove team member";
    let fail = failure(CONTEXT);

    let team_id = required(request.team_id, "Missing team_id in request body").map_err(&fail)?;
    if request.user_id.is_none() && request.user_email.is_none() {
        return error(
            CONTEXT,
            AppError::Validation("user_id or user_email is required".to_string()),
        );
    }

    let settings = upstream_settings(&state, &headers).await;
    let body = MemberDeleteBody {
        team_id,
        user_id: request.user_id,
        user_email: request.user_email,
    };

    state
        .upstream
        .post::<Value, _>(&settings, "/team/member_delete", &body)
        .await
        .map(Json)
        .map_err(fail)
}
