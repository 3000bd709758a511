//! Spend reporting.

use axum::{
    extract::{RawQuery, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;

use super::{failure, upstream_settings, ApiResult};
use crate::AppState;

/// GET /api/spend/report - Relay the global spend report, query string included.
pub async fn spend_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> ApiResult<Value> {
    let settings = upstream_settings(&state, &headers).await;

    let path = match query.as_deref() {
        Some(query) if !query.is_empty() => format!("/global/spend/report?{}", query),
        _ => "/global/spend/report".to_string(),
    };

    state
        .upstream
        .get(&settings, &path)
        .await
        .map(Json)
        .map_err(failure("Failed to fetch spend report"))
}
