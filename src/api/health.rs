//! Upstream health check.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use super::upstream_settings;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/health - Check that the LiteLLM proxy answers `/health`.
pub async fn api_health(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<HealthStatus>) {
    let settings = upstream_settings(&state, &headers).await;

    match state.upstream.get::<Value>(&settings, "/health").await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ok",
                connected: Some(true),
                message: None,
            }),
        ),
        Err(e) => {
            tracing::warn!("Health check against {} failed: {}", settings.base_url, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "error",
                    connected: None,
                    message: Some("Cannot connect to LiteLLM API".to_string()),
                }),
            )
        }
    }
}
