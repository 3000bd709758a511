//! LiteLLM Admin Backend
//!
//! REST backend for the LiteLLM proxy admin dashboard. Relays team, user, key and
//! model management to the proxy and reconciles team membership member by member.

mod api;
mod auth;
mod config;
mod errors;
mod membership;
mod models;
mod upstream;
mod validation;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, SettingsLayer, SettingsStore, UpstreamSettings};
use upstream::UpstreamClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub settings: Arc<SettingsStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LiteLLM Admin Backend");
    tracing::info!("Settings path: {:?}", config.settings_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!(
            "No API PSK configured (LITELLM_ADMIN_PSK). Authentication is disabled!"
        );
    }

    let settings = Arc::new(SettingsStore::open(&config.settings_path).await?);
    let upstream = Arc::new(UpstreamClient::new(config.upstream_timeout)?);

    let initial = settings.layer().await;
    let resolved =
        UpstreamSettings::resolve(&initial, &SettingsLayer::default(), &config.upstream_env);
    tracing::info!(
        "Upstream base URL: {} ({:?}), API key: {:?}",
        resolved.base_url,
        resolved.base_url_source,
        resolved.api_key_source
    );

    // Create application state
    let state = AppState {
        upstream,
        settings,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Teams
        .route("/teams/list", get(api::list_teams))
        .route("/teams/create", post(api::create_team))
        .route("/teams/update", post(api::update_team))
        .route("/teams/delete", post(api::delete_teams))
        .route("/teams/member_add", post(api::add_team_member))
        .route("/teams/member_delete", post(api::delete_team_member))
        // Users
        .route("/users/list", get(api::list_users))
        .route("/users/create", post(api::create_user))
        .route("/users/update", post(api::update_user))
        .route("/users/delete", post(api::delete_users))
        // Keys
        .route("/keys/list", get(api::list_keys))
        .route("/keys/create", post(api::create_key))
        .route("/keys/update", post(api::update_key))
        .route("/keys/delete", post(api::delete_keys))
        // Models
        .route("/models/list", get(api::list_models))
        .route("/models/create", post(api::create_models))
        .route("/models/{id}/update", patch(api::update_model))
        .route("/models/delete", post(api::delete_model))
        // Spend
        .route("/spend/report", get(api::spend_report))
        // Settings
        .route("/config", get(api::get_config))
        .route(
            "/config/set",
            post(api::set_config).delete(api::clear_config),
        )
        .route("/config/test", post(api::test_connection))
        .route("/test", get(api::self_test))
        // Upstream health
        .route("/health", get(api::api_health))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Liveness (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness endpoint.
async fn health_check() -> &'static str {
    "OK"
}
