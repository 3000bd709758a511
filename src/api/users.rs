//! User API endpoints.

use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use serde_json::Value;

use super::{error, failure, success, upstream_settings, ApiJson, ApiQuery, ApiResult};
use crate::errors::AppError;
use crate::models::{
    DeleteUsersBody, DeleteUsersRequest, UserListQuery, UserListResponse, UserPayload,
};
use crate::validation::validate_user;
use crate::AppState;

/// GET /api/users/list - List users, one page at a time.
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> ApiResult<UserListResponse> {
    let settings = upstream_settings(&state, &headers).await;

    if !settings.is_configured() {
        tracing::debug!("Upstream not configured, returning no users");
        return success(UserListResponse::empty(query.page_size));
    }

    let params = query.upstream_params();
    state
        .upstream
        .get_with_query(&settings, "/user/list", &params)
        .await
        .map(Json)
        .map_err(failure("Failed to fetch users"))
}

/// POST /api/users/create - Create a new user.
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<UserPayload>,
) -> ApiResult<Value> {
    const CONTEXT: &str = "Failed to create user";

    if let Err(e) = validate_user(&payload) {
        return error(CONTEXT, e);
    }

    let settings = upstream_settings(&state, &headers).await;
    let body = payload.into_create_body();

    match state.upstream.post::<Value, _>(&settings, "/user/new", &body).await {
        Ok(user) => {
            tracing::info!("Created user {:?}", body.user_email);
            success(user)
        }
        Err(e) => error(CONTEXT, e),
    }
}

/// POST /api/users/update - Update a user.
pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<UserPayload>,
) -> ApiResult<Value> {
    let fail = failure("Failed to update user");

    validate_user(&payload).map_err(&fail)?;

    let settings = upstream_settings(&state, &headers).await;
    state
        .upstream
        .post(&settings, "/user/update", &payload)
        .await
        .map(Json)
        .map_err(fail)
}

/// POST /api/users/delete - Delete one or more users.
pub async fn delete_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<DeleteUsersRequest>,
) -> ApiResult<Value> {
    const CONTEXT: &str = "Failed to delete user";

    let user_ids = request
        .user_ids
        .map(|ids| ids.into_vec())
        .unwrap_or_default();
    if user_ids.is_empty() {
        return error(
            CONTEXT,
            AppError::Validation("user_ids is required".to_string()),
        );
    }

    let settings = upstream_settings(&state, &headers).await;
    let body = DeleteUsersBody { user_ids };

    match state.upstream.post::<Value, _>(&settings, "/user/delete", &body).await {
        Ok(data) => {
            tracing::info!("Deleted users {:?}", body.user_ids);
            success(data)
        }
        Err(e) => error(CONTEXT, e),
    }
}
