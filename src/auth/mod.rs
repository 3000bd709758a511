//! PSK-based authentication for the admin API.
//!
//! Implements constant-time comparison to mitigate timing attacks.

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::{ApiFailure, AppError};

/// Header name for the admin API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// PSK authentication layer function that takes the expected PSK as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // No PSK configured: dev mode
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
        .map(str::to_string);

    match provided {
        Some(key) if constant_time_compare(&key, &expected) => next.run(request).await,
        Some(_) => unauthorized_response("Invalid API key"),
        None => unauthorized_response("Missing API key"),
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    ApiFailure {
        context: "Unauthorized",
        error: AppError::Unauthorized(message.to_string()),
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn guarded(psk: Option<&str>) -> Router {
        let psk = psk.map(str::to_string);
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn(move |req, next| {
                psk_auth_layer(psk.clone(), req, next)
            }))
    }

    async fn status_for(router: Router, header: Option<(&str, &str)>) -> StatusCode {
        let mut request = HttpRequest::builder().uri("/ping");
        if let Some((name, value)) = header {
            request = request.header(name, value);
        }
        router
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_constant_time_compare_empty() {
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("", "not-empty"));
    }

    #[tokio::test]
    async fn test_open_without_psk() {
        assert_eq!(status_for(guarded(None), None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_psk_required() {
        assert_eq!(
            status_for(guarded(Some("secret")), None).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(guarded(Some("secret")), Some(("x-api-key", "wrong"))).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(guarded(Some("secret")), Some(("x-api-key", "secret"))).await,
            StatusCode::OK
        );
        assert_eq!(
            status_for(
                guarded(Some("secret")),
                Some(("authorization", "Bearer secret"))
            )
            .await,
            StatusCode::OK
        );
    }
}
