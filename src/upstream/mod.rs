//! HTTP client for the upstream LiteLLM proxy.
//!
//! Every call takes the request's resolved [`UpstreamSettings`], authenticates with
//! `Authorization: Bearer <key>` and expects a JSON body back.

mod team_members;

pub use team_members::*;

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::UpstreamSettings;
use crate::errors::AppError;

/// Timeout for ad-hoc connection tests from the settings page.
pub const CONNECTION_TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared LiteLLM client.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }

    /// GET a path.
    pub async fn get<T: DeserializeOwned>(
        &self,
        settings: &UpstreamSettings,
        path: &str,
    ) -> Result<T, AppError> {
        let url = settings.url(path);
        let request = self.http.request(Method::GET, &url);
        self.send(settings, Method::GET, &url, request).await
    }

    /// GET a path with query parameters.
    pub async fn get_with_query<T, Q>(
        &self,
        settings: &UpstreamSettings,
        path: &str,
        query: &Q,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = settings.url(path);
        let request = self.http.request(Method::GET, &url).query(query);
        self.send(settings, Method::GET, &url, request).await
    }

    /// POST a JSON body to a path.
    pub async fn post<T, B>(
        &self,
        settings: &UpstreamSettings,
        path: &str,
        body: &B,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = settings.url(path);
        let request = self.http.request(Method::POST, &url).json(body);
        self.send(settings, Method::POST, &url, request).await
    }

    /// PATCH a JSON body to a path.
    pub async fn patch<T, B>(
        &self,
        settings: &UpstreamSettings,
        path: &str,
        body: &B,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = settings.url(path);
        let request = self.http.request(Method::PATCH, &url).json(body);
        self.send(settings, Method::PATCH, &url, request).await
    }

    /// Fetch `{base_url}/models` with explicit credentials, bypassing stored settings.
    pub async fn probe_models(
        &self,
        base_url: &str,
        api_key: &str,
    ) -> Result<serde_json::Value, AppError> {
        let settings = UpstreamSettings {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: Some(api_key.to_string()),
            base_url_source: crate::config::SettingsSource::Request,
            api_key_source: crate::config::SettingsSource::Request,
        };
        let url = settings.url("/models");
        let request = self
            .http
            .request(Method::GET, &url)
            .timeout(CONNECTION_TEST_TIMEOUT);
        self.send(&settings, Method::GET, &url, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        settings: &UpstreamSettings,
        method: Method,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T, AppError> {
        let api_key = settings.require_key()?;

        tracing::debug!("Upstream request: {} {}", method, url);

        let response = request
            .bearer_auth(api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        tracing::info!("Upstream response: {} {} -> {}", method, url, status);

        if !status.is_success() {
            tracing::warn!("Upstream error body from {}: {}", url, text);
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse upstream response from {}: {}", url, e);
            AppError::UpstreamParse(format!("Invalid JSON response from server: {}", e))
        })
    }
}
