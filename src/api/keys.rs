//! API key endpoints.

use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use futures_util::future::join_all;
use serde_json::Value;

use super::{error, failure, required, success, upstream_settings, ApiJson, ApiQuery, ApiResult};
use crate::config::UpstreamSettings;
use crate::errors::AppError;
use crate::models::{
    ApiKey, CreatedKey, DeleteKeysBody, DeleteKeysRequest, KeyBody, KeyEntry, KeyInfoResponse,
    KeyListQuery, KeyListResponse, KeyPayload, UpstreamKeyList,
};
use crate::upstream::UpstreamClient;
use crate::validation::validate_budget_duration;
use crate::AppState;

/// GET /api/keys/list - List keys with their details.
///
/// Details for every key on the page are fetched concurrently. A key whose lookup
/// fails is still listed, as `{ "key": ... }`.
pub async fn list_keys(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<KeyListQuery>,
) -> ApiResult<KeyListResponse> {
    let settings = upstream_settings(&state, &headers).await;

    if !settings.is_configured() {
        tracing::debug!("Upstream not configured, returning no keys");
        return success(KeyListResponse::empty());
    }

    let params = [
        ("page", query.page.to_string()),
        ("size", query.size.to_string()),
    ];
    let list: UpstreamKeyList = state
        .upstream
        .get_with_query(&settings, "/key/list", &params)
        .await
        .map_err(failure("Failed to fetch API keys"))?;

    let keys = join_all(
        list.keys
            .into_iter()
            .map(|key| key_entry(&state.upstream, &settings, key)),
    )
    .await;

    success(KeyListResponse {
        keys,
        total_count: list.total_count,
        current_page: query.page,
        total_pages: list.total_pages,
    })
}

async fn key_entry(client: &UpstreamClient, settings: &UpstreamSettings, key: String) -> KeyEntry {
    let params = [("key", key.as_str())];
    match client
        .get_with_query::<KeyInfoResponse, _>(settings, "/key/info", &params)
        .await
    {
        Ok(response) => KeyEntry::Detailed(ApiKey::from_info(key, response.info)),
        Err(e) => {
            tracing::warn!("Failed to fetch key info: {}", e);
            KeyEntry::Basic { key }
        }
    }
}

/// POST /api/keys/create - Generate a new key.
pub async fn create_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<KeyPayload>,
) -> ApiResult<CreatedKey> {
    let fail = failure("Failed to create API key");

    validate_budget_duration(payload.budget_duration.as_deref()).map_err(&fail)?;

    let settings = upstream_settings(&state, &headers).await;
    let body = KeyBody::for_generate(payload);

    let key: CreatedKey = state
        .upstream
        .post(&settings, "/key/generate", &body)
        .await
        .map_err(&fail)?;

    tracing::info!("Generated key {:?}", key.key_alias);
    success(key)
}

/// POST /api/keys/update - Update an existing key.
pub async fn update_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<KeyPayload>,
) -> ApiResult<Value> {
    let fail = failure("Failed to update API key");

    let key_id = required(payload.id.clone(), "Missing key id in request body").map_err(&fail)?;
    validate_budget_duration(payload.budget_duration.as_deref()).map_err(&fail)?;

    let settings = upstream_settings(&state, &headers).await;
    let body = KeyBody::for_update(key_id, payload);

    state
        .upstream
        .post(&settings, "/key/update", &body)
        .await
        .map(Json)
        .map_err(fail)
}

/// POST /api/keys/delete - Delete keys by value or alias.
pub async fn delete_keys(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<DeleteKeysRequest>,
) -> ApiResult<Value> {
    const CONTEXT: &str = "Failed to delete API key";

    if request.keys.is_none() && request.key_aliases.is_none() {
        return error(
            CONTEXT,
            AppError::Validation("Either keys or key_aliases must be provided".to_string()),
        );
    }

    let settings = upstream_settings(&state, &headers).await;
    let body = DeleteKeysBody {
        keys: request.keys,
        key_aliases: request.key_aliases,
    };

    match state.upstream.post::<Value, _>(&settings, "/key/delete", &body).await {
        Ok(data) => {
            tracing::info!("Deleted keys");
            success(data)
        }
        Err(e) => error(CONTEXT, e),
    }
}
