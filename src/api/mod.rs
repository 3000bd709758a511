//! REST API module.
//!
//! Contains all dashboard-facing routes. Each handler validates and reshapes the
//! request, forwards it to the LiteLLM proxy and relays the JSON it gets back.

mod health;
mod keys;
mod models;
mod settings;
mod spend;
mod teams;
mod users;

pub use health::*;
pub use keys::*;
pub use models::*;
pub use settings::*;
pub use spend::*;
pub use teams::*;
pub use users::*;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::{request::Parts, HeaderMap},
    Json,
};

use crate::config::{SettingsLayer, UpstreamSettings};
use crate::errors::{ApiFailure, AppError};
use crate::AppState;

/// Response type that can be either relayed JSON or an error.
pub type ApiResult<T> = Result<Json<T>, ApiFailure>;

/// Create a successful API response.
pub fn success<T>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}

/// Create an error API response.
pub fn error<T>(context: &'static str, err: AppError) -> ApiResult<T> {
    Err(ApiFailure {
        context,
        error: err,
    })
}

/// Attach a route's context message to an error, for use with `map_err`.
pub fn failure(context: &'static str) -> impl Fn(AppError) -> ApiFailure {
    move |error| ApiFailure { context, error }
}

/// JSON body extractor that rejects with the standard error body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiFailure {
                context: "Invalid request body",
                error: AppError::Validation(rejection.body_text()),
            }),
        }
    }
}

/// Query string extractor that rejects with the standard error body.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiFailure {
                context: "Invalid query string",
                error: AppError::Validation(rejection.body_text()),
            }),
        }
    }
}

/// Resolve the upstream settings for one request.
///
/// With a PSK configured, `x-api-key` authenticates the dashboard itself and is not
/// read as an upstream key.
pub async fn upstream_settings(state: &AppState, headers: &HeaderMap) -> UpstreamSettings {
    let store = state.settings.layer().await;
    let request = SettingsLayer::from_headers(headers, state.config.api_psk.is_none());
    UpstreamSettings::resolve(&store, &request, &state.config.upstream_env)
}

/// Require a non-empty string field.
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}
