//! User models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient_f64, lenient_u64, null_default, OneOrMany};

/// Proxy-level role of a user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    ProxyAdmin,
    ProxyAdminViewer,
    InternalUser,
    InternalUserViewer,
}

/// User fields submitted by the create and edit forms.
///
/// Serialized back out as-is for `/user/update`; unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub tpm_limit: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub rpm_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_cache_controls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_parallel_requests: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub soft_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_max_budget: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_rpm_limit: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_tpm_limit: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_create_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_invite_email: Option<bool>,
}

impl UserPayload {
    /// Body for `/user/new`: no models, unblocked, and a key is created unless declined.
    pub fn into_create_body(mut self) -> Self {
        self.models = Some(self.models.unwrap_or_default());
        self.blocked = Some(self.blocked.unwrap_or(false));
        self.auto_create_key = Some(self.auto_create_key.unwrap_or(true));
        self
    }
}

/// Query parameters for listing users.
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_ids: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    25
}

impl UserListQuery {
    /// Query pairs forwarded to `/user/list`.
    pub fn upstream_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(role) = &self.role {
            params.push(("role", role.clone()));
        }
        if let Some(user_ids) = &self.user_ids {
            params.push(("user_ids", user_ids.clone()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("page_size", self.page_size.to_string()));
        params
    }
}

/// A user row in the dashboard's user table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub teams: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_duration: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpm_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spend: Option<f64>,
}

/// One page of users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub users: Vec<UserSummary>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u64>,
}

impl UserListResponse {
    /// Page returned when no upstream is configured.
    pub fn empty(page_size: u32) -> Self {
        Self {
            users: Vec::new(),
            total: Some(0),
            page: Some(1),
            page_size: Some(page_size as u64),
            total_pages: Some(0),
        }
    }
}

/// Request body for deleting users.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteUsersRequest {
    #[serde(default)]
    pub user_ids: Option<OneOrMany<String>>,
}

/// Upstream body for `/user/delete`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteUsersBody {
    pub user_ids: Vec<String>,
}
