//! Configuration module for the LiteLLM admin backend.
//!
//! Server configuration is loaded from environment variables with sensible defaults.
//! Upstream connection settings are layered on top of it, see [`upstream`].

mod store;
mod upstream;

pub use store::*;
pub use upstream::*;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the admin API (optional in development)
    pub api_psk: Option<String>,
    /// Path to the persisted upstream settings file
    pub settings_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Timeout applied to every upstream request
    pub upstream_timeout: Duration,
    /// Environment tier of the upstream settings
    pub upstream_env: SettingsLayer,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = non_empty_var("LITELLM_ADMIN_PSK");

        let settings_path = env::var("LITELLM_ADMIN_SETTINGS_PATH")
            .unwrap_or_else(|_| "./data/settings.json".to_string())
            .into();

        let bind_addr = env::var("LITELLM_ADMIN_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid LITELLM_ADMIN_BIND_ADDR format");

        let log_level = env::var("LITELLM_ADMIN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let upstream_timeout = env::var("LITELLM_ADMIN_UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let upstream_env = SettingsLayer {
            api_base_url: non_empty_var("NEXT_PUBLIC_API_BASE_URL"),
            api_key: non_empty_var("LITELLM_API_KEY"),
        };

        Self {
            api_psk,
            settings_path,
            bind_addr,
            log_level,
            upstream_timeout,
            upstream_env,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        env::remove_var("LITELLM_ADMIN_PSK");
        env::remove_var("LITELLM_ADMIN_SETTINGS_PATH");
        env::remove_var("LITELLM_ADMIN_BIND_ADDR");
        env::remove_var("LITELLM_ADMIN_LOG_LEVEL");
        env::remove_var("LITELLM_ADMIN_UPSTREAM_TIMEOUT_SECS");

        let config = Config::from_env();

        assert!(config.api_psk.is_none());
        assert_eq!(config.settings_path, PathBuf::from("./data/settings.json"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
    }
}
