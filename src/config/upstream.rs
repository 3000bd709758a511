//! Upstream connection settings and their three-tier resolution.
//!
//! Each request resolves one explicit [`UpstreamSettings`] value from, in order:
//! the persisted settings store, the browser-supplied request headers, and the
//! process environment. The result is handed to the upstream client; nothing is
//! kept in a global.

use axum::http::HeaderMap;
use serde::Serialize;

use crate::errors::AppError;

/// Base URL used when no tier supplies one.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000";

/// Header carrying the browser's base URL.
pub const BASE_URL_HEADER: &str = "x-api-base-url";
/// Header carrying the browser's API key.
pub const UPSTREAM_KEY_HEADER: &str = "x-api-key";

/// One tier of partially-specified settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsLayer {
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
}

impl SettingsLayer {
    /// Browser-supplied tier read from the request headers.
    ///
    /// When the admin API itself is PSK-protected the `x-api-key` header is the PSK,
    /// so the caller decides whether to read the key from it.
    pub fn from_headers(headers: &HeaderMap, include_key: bool) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            api_base_url: read(BASE_URL_HEADER),
            api_key: if include_key {
                read(UPSTREAM_KEY_HEADER)
            } else {
                None
            },
        }
    }
}

/// Which tier supplied a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSource {
    Store,
    Request,
    Environment,
    Default,
    Missing,
}

/// Fully resolved settings passed to every upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub base_url_source: SettingsSource,
    pub api_key_source: SettingsSource,
}

impl UpstreamSettings {
    /// Resolve settings field by field: store, then request, then environment.
    pub fn resolve(store: &SettingsLayer, request: &SettingsLayer, env: &SettingsLayer) -> Self {
        let pick = |get: fn(&SettingsLayer) -> &Option<String>| {
            [
                (store, SettingsSource::Store),
                (request, SettingsSource::Request),
                (env, SettingsSource::Environment),
            ]
            .into_iter()
            .find_map(|(layer, source)| {
                get(layer)
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (v.to_string(), source))
            })
        };

        let (base_url, base_url_source) = pick(|l| &l.api_base_url)
            .unwrap_or_else(|| (DEFAULT_API_BASE_URL.to_string(), SettingsSource::Default));
        let (api_key, api_key_source) = match pick(|l| &l.api_key) {
            Some((key, source)) => (Some(key), source),
            None => (None, SettingsSource::Missing),
        };

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            base_url_source,
            api_key_source,
        }
    }

    /// Whether an API key was found in any tier.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// The API key, or a `MissingConfig` error.
    pub fn require_key(&self) -> Result<&str, AppError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::MissingConfig("API key not configured".to_string()))
    }

    /// Join a path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(url: Option<&str>, key: Option<&str>) -> SettingsLayer {
        SettingsLayer {
            api_base_url: url.map(str::to_string),
            api_key: key.map(str::to_string),
        }
    }

    #[test]
    fn test_store_wins_over_request_and_env() {
        let settings = UpstreamSettings::resolve(
            &layer(Some("http://store:4000"), Some("store-key")),
            &layer(Some("http://browser:4000"), Some("browser-key")),
            &layer(Some("http://env:4000"), Some("env-key")),
        );
        assert_eq!(settings.base_url, "http://store:4000");
        assert_eq!(settings.api_key.as_deref(), Some("store-key"));
        assert_eq!(settings.base_url_source, SettingsSource::Store);
    }

    #[test]
    fn test_fields_resolve_independently() {
        let settings = UpstreamSettings::resolve(
            &layer(None, Some("store-key")),
            &layer(Some("http://browser:4000/"), None),
            &layer(Some("http://env:4000"), Some("env-key")),
        );
        assert_eq!(settings.base_url, "http://browser:4000");
        assert_eq!(settings.base_url_source, SettingsSource::Request);
        assert_eq!(settings.api_key.as_deref(), Some("store-key"));
        assert_eq!(settings.api_key_source, SettingsSource::Store);
    }

    #[test]
    fn test_empty_values_fall_through() {
        let settings = UpstreamSettings::resolve(
            &layer(Some(""), Some("  ")),
            &SettingsLayer::default(),
            &layer(None, Some("env-key")),
        );
        assert_eq!(settings.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.base_url_source, SettingsSource::Default);
        assert_eq!(settings.api_key_source, SettingsSource::Environment);
    }

    #[test]
    fn test_missing_key() {
        let settings = UpstreamSettings::resolve(
            &SettingsLayer::default(),
            &SettingsLayer::default(),
            &SettingsLayer::default(),
        );
        assert!(!settings.is_configured());
        assert!(matches!(
            settings.require_key(),
            Err(AppError::MissingConfig(_))
        ));
    }

    #[test]
    fn test_url_join() {
        let settings = UpstreamSettings::resolve(
            &layer(Some("http://proxy:4000/"), Some("k")),
            &SettingsLayer::default(),
            &SettingsLayer::default(),
        );
        assert_eq!(settings.url("/team/list"), "http://proxy:4000/team/list");
        assert_eq!(settings.url("health"), "http://proxy:4000/health");
    }

    #[test]
    fn test_headers_layer() {
        let mut headers = HeaderMap::new();
        headers.insert(BASE_URL_HEADER, "http://browser:4000".parse().unwrap());
        headers.insert(UPSTREAM_KEY_HEADER, "sk-browser".parse().unwrap());

        let with_key = SettingsLayer::from_headers(&headers, true);
        assert_eq!(with_key.api_key.as_deref(), Some("sk-browser"));

        let without_key = SettingsLayer::from_headers(&headers, false);
        assert_eq!(
            without_key.api_base_url.as_deref(),
            Some("http://browser:4000")
        );
        assert!(without_key.api_key.is_none());
    }
}
