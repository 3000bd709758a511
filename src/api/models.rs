//! Model deployment endpoints.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use futures_util::future::join_all;
use serde::Serialize;
use serde_json::Value;

use super::{error, failure, required, success, upstream_settings, ApiJson, ApiQuery, ApiResult};
use crate::errors::AppError;
use crate::models::{
    describe_model, CreateModelsRequest, DataList, DeleteModelBody, DeleteModelRequest,
    ModelCreateResult, ModelGroupInfo, ModelListQuery, UpdateModelRequest,
};
use crate::AppState;

/// Models list as returned to the dashboard.
#[derive(Debug, Serialize)]
pub struct ModelListResponse {
    pub data: Vec<Value>,
}

/// Per-model outcomes of a bulk create.
#[derive(Debug, Serialize)]
pub struct CreateModelsResponse {
    pub results: Vec<ModelCreateResult>,
}

/// GET /api/models/list - List models, enriched with pricing and token limits.
pub async fn list_models(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<ModelListQuery>,
) -> ApiResult<ModelListResponse> {
    let settings = upstream_settings(&state, &headers).await;

    if !settings.is_configured() {
        tracing::debug!("Upstream not configured, returning no models");
        return success(ModelListResponse { data: Vec::new() });
    }

    let wildcard: &[(&str, &str)] = if query.wildcard_routes() {
        &[("return_wildcard_routes", "true")]
    } else {
        &[]
    };

    let (models, groups) = tokio::join!(
        state
            .upstream
            .get_with_query::<DataList, _>(&settings, "/v1/models", wildcard),
        state.upstream.get::<DataList>(&settings, "/model_group/info"),
    );

    let models = models.map_err(failure("Failed to fetch models"))?;

    let groups: HashMap<String, ModelGroupInfo> = match groups {
        Ok(groups) => groups
            .data
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<ModelGroupInfo>(entry).ok())
            .map(|info| (info.model_group.clone(), info))
            .collect(),
        Err(e) => {
            tracing::warn!(
                "Model group info unavailable, continuing with limited model information: {}",
                e
            );
            HashMap::new()
        }
    };

    let data = models
        .data
        .iter()
        .map(|model| {
            let id = model.get("id").and_then(Value::as_str).unwrap_or_default();
            describe_model(model, groups.get(id))
        })
        .collect();

    success(ModelListResponse { data })
}

/// POST /api/models/create - Register one deployment per requested model name.
///
/// Deployments are created concurrently and each reports its own outcome; one
/// failure does not fail the request.
pub async fn create_models(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<CreateModelsRequest>,
) -> ApiResult<CreateModelsResponse> {
    const CONTEXT: &str = "Failed to create models";

    if request.models.is_empty() {
        return error(
            CONTEXT,
            AppError::Validation("At least one model is required".to_string()),
        );
    }

    let settings = upstream_settings(&state, &headers).await;
    if let Err(e) = settings.require_key() {
        return error(CONTEXT, e);
    }

    let bodies = request.bodies();
    let results = join_all(bodies.iter().map(|body| {
        let upstream = &state.upstream;
        let settings = &settings;
        async move {
            match upstream
                .post::<Value, _>(settings, "/model/new", body)
                .await
            {
                Ok(data) => ModelCreateResult {
                    model: body.model_name.clone(),
                    data: Some(data),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!("Failed to create model {}: {}", body.model_name, e);
                    ModelCreateResult {
                        model: body.model_name.clone(),
                        data: None,
                        error: Some(format!("Failed to create model: {}", e.message())),
                    }
                }
            }
        }
    }))
    .await;

    tracing::info!(
        "Created {} of {} models",
        results.iter().filter(|r| r.error.is_none()).count(),
        results.len()
    );

    success(CreateModelsResponse { results })
}

/// PATCH /api/models/{id}/update - Update a deployment.
pub async fn update_model(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(model_id): Path<String>,
    ApiJson(request): ApiJson<UpdateModelRequest>,
) -> ApiResult<Value> {
    let fail = failure("Failed to update model");

    let model_id = required(Some(model_id), "Model ID is required").map_err(&fail)?;

    let settings = upstream_settings(&state, &headers).await;
    let path = format!("/model/{}/update", model_id);

    state
        .upstream
        .patch(&settings, &path, &request)
        .await
        .map(Json)
        .map_err(fail)
}

/// POST /api/models/delete - Delete a deployment.
pub async fn delete_model(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<DeleteModelRequest>,
) -> ApiResult<Value> {
    let fail = failure("Failed to delete model");

    let id = required(request.model_id, "Missing model_id in request body").map_err(&fail)?;

    let settings = upstream_settings(&state, &headers).await;
    let body = DeleteModelBody { id };

    let data = state
        .upstream
        .post(&settings, "/model/delete", &body)
        .await
        .map_err(&fail)?;

    tracing::info!("Deleted model {}", body.id);
    success(data)
}
