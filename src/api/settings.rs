//! Upstream connection settings and self-test endpoints.

use axum::{extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{error, failure, required, success, upstream_settings, ApiJson, ApiResult};
use crate::config::{SettingsSource, KEY_API_BASE_URL, KEY_API_KEY};
use crate::AppState;

/// Effective upstream settings as shown on the settings page. The key itself is
/// never returned.
#[derive(Debug, Serialize)]
pub struct ConfigView {
    pub api_base_url: String,
    pub has_api_key: bool,
    pub api_base_url_source: SettingsSource,
    pub api_key_source: SettingsSource,
}

/// Body of `POST /api/config/set`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetConfigRequest {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigUpdated {
    pub success: bool,
}

/// Body of `POST /api/config/test`.
#[derive(Debug, Deserialize)]
pub struct ConnectionTestRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionTestResponse {
    pub success: bool,
    pub message: String,
    pub models: Value,
}

#[derive(Debug, Serialize)]
pub struct SelfTestResponse {
    pub message: String,
    pub timestamp: String,
    pub env: SelfTestEnv,
}

#[derive(Debug, Serialize)]
pub struct SelfTestEnv {
    pub api_base_url: Option<String>,
    pub has_api_key: bool,
}

/// GET /api/config - Show the settings a request from this client would use.
pub async fn get_config(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<ConfigView> {
    let settings = upstream_settings(&state, &headers).await;

    success(ConfigView {
        has_api_key: settings.is_configured(),
        api_base_url: settings.base_url,
        api_base_url_source: settings.base_url_source,
        api_key_source: settings.api_key_source,
    })
}

/// POST /api/config/set - Persist the base URL and key.
pub async fn set_config(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SetConfigRequest>,
) -> ApiResult<ConfigUpdated> {
    let fail = failure("Failed to set configuration");

    let base_url = required(request.api_base_url, "API Base URL is required").map_err(&fail)?;
    let api_key = required(request.api_key, "API Key is required").map_err(&fail)?;

    state
        .settings
        .set_many(&[
            (KEY_API_BASE_URL, base_url.trim_end_matches('/')),
            (KEY_API_KEY, api_key.as_str()),
        ])
        .await
        .map_err(&fail)?;

    success(ConfigUpdated { success: true })
}

/// DELETE /api/config/set - Forget the persisted settings.
pub async fn clear_config(State(state): State<AppState>) -> ApiResult<ConfigUpdated> {
    match state.settings.clear().await {
        Ok(()) => success(ConfigUpdated { success: true }),
        Err(e) => error("Failed to clear configuration", e),
    }
}

/// POST /api/config/test - Try a base URL and key before saving them.
pub async fn test_connection(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ConnectionTestRequest>,
) -> ApiResult<ConnectionTestResponse> {
    let fail = failure("Failed to connect to API");

    let url = required(request.url, "URL is required").map_err(&fail)?;
    let api_key = required(request.api_key, "API key is required").map_err(&fail)?;

    tracing::info!("Testing connection to {}", url);

    let models = state
        .upstream
        .probe_models(&url, &api_key)
        .await
        .map_err(&fail)?;

    success(ConnectionTestResponse {
        success: true,
        message: "Successfully connected to API".to_string(),
        models,
    })
}

/// GET /api/test - Confirm the backend is serving and report its environment tier.
pub async fn self_test(State(state): State<AppState>) -> ApiResult<SelfTestResponse> {
    let env = &state.config.upstream_env;

    success(SelfTestResponse {
        message: "API route is working".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        env: SelfTestEnv {
            api_base_url: env.api_base_url.clone(),
            has_api_key: env.api_key.is_some(),
        },
    })
}
