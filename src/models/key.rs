//! API key models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient_f64, lenient_u64, null_default};

/// Key fields submitted by the create and edit forms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyPayload {
    /// Existing key identifier, required when editing
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub key_alias: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub models: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub spend: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max_budget: Option<f64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub max_parallel_requests: Option<u64>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub tpm_limit: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub rpm_limit: Option<u64>,
    #[serde(default)]
    pub budget_duration: Option<String>,
    #[serde(default)]
    pub allowed_cache_controls: Option<Vec<String>>,
    #[serde(default)]
    pub config: Option<Value>,
    #[serde(default)]
    pub permissions: Option<Value>,
    #[serde(default)]
    pub model_max_budget: Option<Value>,
    #[serde(default)]
    pub model_rpm_limit: Option<Value>,
    #[serde(default)]
    pub model_tpm_limit: Option<Value>,
    #[serde(default)]
    pub guardrails: Option<Value>,
    #[serde(default)]
    pub blocked: Option<bool>,
    #[serde(default)]
    pub aliases: Option<Value>,
    #[serde(default)]
    pub budget_id: Option<String>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub enforced_params: Option<Value>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub soft_budget: Option<f64>,
    #[serde(default)]
    pub send_invite_email: Option<bool>,
}

/// Upstream body for `/key/generate` and `/key/update`.
#[derive(Debug, Clone, Serialize)]
pub struct KeyBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spend: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel_requests: Option<u64>,
    pub metadata: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tpm_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_duration: Option<String>,
    pub allowed_cache_controls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    pub permissions: Value,
    pub model_max_budget: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_rpm_limit: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_tpm_limit: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrails: Option<Value>,
    pub blocked: bool,
    pub aliases: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforced_params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_invite_email: Option<bool>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl KeyBody {
    /// Body for `/key/generate`. Spend starts at zero.
    pub fn for_generate(payload: KeyPayload) -> Self {
        let mut body = Self::from_payload(payload);
        body.key = None;
        body.spend = Some(body.spend.unwrap_or(0.0));
        body.config = Some(body.config.unwrap_or_else(empty_object));
        body
    }

    /// Body for `/key/update`, addressing the key by its identifier.
    pub fn for_update(key_id: String, payload: KeyPayload) -> Self {
        let mut body = Self::from_payload(payload);
        body.key = Some(key_id);
        body.config = None;
        body.budget_id = None;
        body.enforced_params = None;
        body.send_invite_email = None;
        body
    }

    fn from_payload(payload: KeyPayload) -> Self {
        Self {
            key: payload.id,
            key_alias: payload.key_alias,
            duration: payload.duration,
            models: payload.models.unwrap_or_default(),
            spend: payload.spend,
            max_budget: payload.max_budget,
            user_id: payload.user_id,
            team_id: payload.team_id,
            max_parallel_requests: payload.max_parallel_requests,
            metadata: payload.metadata.unwrap_or_else(empty_object),
            tpm_limit: payload.tpm_limit,
            rpm_limit: payload.rpm_limit,
            budget_duration: payload.budget_duration,
            allowed_cache_controls: payload.allowed_cache_controls.unwrap_or_default(),
            config: payload.config,
            permissions: payload.permissions.unwrap_or_else(empty_object),
            model_max_budget: payload.model_max_budget.unwrap_or_else(empty_object),
            model_rpm_limit: payload.model_rpm_limit,
            model_tpm_limit: payload.model_tpm_limit,
            guardrails: payload.guardrails,
            blocked: payload.blocked.unwrap_or(false),
            aliases: payload.aliases.unwrap_or_else(empty_object),
            budget_id: payload.budget_id,
            tags: payload.tags,
            enforced_params: payload.enforced_params,
            soft_budget: payload.soft_budget,
            send_invite_email: payload.send_invite_email,
        }
    }
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .filter(|v| !v.is_null())
        .unwrap_or_else(empty_object))
}

/// Freshly generated key, including the secret which is shown only once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedKey {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub key_alias: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub models: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub spend: f64,
    #[serde(default)]
    pub max_budget: Option<f64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub max_parallel_requests: Option<u64>,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub metadata: Value,
    #[serde(default)]
    pub tpm_limit: Option<u64>,
    #[serde(default)]
    pub rpm_limit: Option<u64>,
    #[serde(default)]
    pub budget_duration: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub allowed_cache_controls: Vec<String>,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub config: Value,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub permissions: Value,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub model_max_budget: Value,
    #[serde(default)]
    pub model_rpm_limit: Option<Value>,
    #[serde(default)]
    pub model_tpm_limit: Option<Value>,
    #[serde(default)]
    pub guardrails: Option<Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub blocked: bool,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub aliases: Value,
    #[serde(default)]
    pub budget_id: Option<String>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub enforced_params: Option<Value>,
    #[serde(default)]
    pub soft_budget: Option<f64>,
}

/// Detailed key record shown in the dashboard's key table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_alias: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub spend: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub models: Vec<String>,
    #[serde(default = "empty_object")]
    pub aliases: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default = "empty_object")]
    pub permissions: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel_requests: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpm_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Key record as returned inside `/key/info`'s `info` field.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyInfo {
    #[serde(default)]
    pub key_name: Option<String>,
    #[serde(default)]
    pub key_alias: Option<String>,
    #[serde(default)]
    pub spend: Option<f64>,
    #[serde(default)]
    pub max_budget: Option<f64>,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub models: Option<Vec<String>>,
    #[serde(default)]
    pub aliases: Option<Value>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub permissions: Option<Value>,
    #[serde(default)]
    pub max_parallel_requests: Option<u64>,
    #[serde(default)]
    pub tpm_limit: Option<u64>,
    #[serde(default)]
    pub rpm_limit: Option<u64>,
    #[serde(default)]
    pub budget_duration: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Envelope of `/key/info`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyInfoResponse {
    pub info: KeyInfo,
}

impl ApiKey {
    pub fn from_info(id: String, info: KeyInfo) -> Self {
        Self {
            id,
            key: info.key_name,
            key_alias: info.key_alias,
            spend: info.spend.unwrap_or(0.0),
            max_budget: info.max_budget,
            expires: info.expires,
            models: info.models.unwrap_or_default(),
            aliases: info.aliases.unwrap_or_else(empty_object),
            user_id: info.user_id,
            team_id: info.team_id,
            permissions: info.permissions.unwrap_or_else(empty_object),
            max_parallel_requests: info.max_parallel_requests,
            tpm_limit: info.tpm_limit,
            rpm_limit: info.rpm_limit,
            budget_duration: info.budget_duration,
            created_at: info.created_at,
            updated_at: info.updated_at,
        }
    }
}

/// A key list entry: full details, or just the key when its lookup failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyEntry {
    Detailed(ApiKey),
    Basic { key: String },
}

/// Query parameters for listing keys.
#[derive(Debug, Deserialize)]
pub struct KeyListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    10
}

/// Envelope of `/key/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamKeyList {
    #[serde(default, deserialize_with = "null_default")]
    pub keys: Vec<String>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u64>,
}

/// One page of keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyListResponse {
    pub keys: Vec<KeyEntry>,
    pub total_count: Option<u64>,
    pub current_page: u32,
    pub total_pages: Option<u64>,
}

impl KeyListResponse {
    /// Page returned when no upstream is configured.
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            total_count: Some(0),
            current_page: 1,
            total_pages: Some(0),
        }
    }
}

/// Request body for deleting keys.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteKeysRequest {
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(default)]
    pub key_aliases: Option<Vec<String>>,
}

/// Upstream body for `/key/delete`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteKeysBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_aliases: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_body_defaults() {
        let payload: KeyPayload = serde_json::from_value(json!({
            "key_alias": "ci",
            "rpm_limit": "60"
        }))
        .unwrap();

        let body = serde_json::to_value(KeyBody::for_generate(payload)).unwrap();
        assert_eq!(body["key_alias"], "ci");
        assert_eq!(body["rpm_limit"], 60);
        assert_eq!(body["spend"], 0.0);
        assert_eq!(body["metadata"], json!({}));
        assert_eq!(body["config"], json!({}));
        assert_eq!(body["blocked"], false);
        assert!(body.get("key").is_none());
    }

    #[test]
    fn test_update_body_uses_id_as_key() {
        let payload: KeyPayload = serde_json::from_value(json!({
            "id": "hashed-token",
            "budget_duration": "30d"
        }))
        .unwrap();

        let id = payload.id.clone().unwrap();
        let body = serde_json::to_value(KeyBody::for_update(id, payload)).unwrap();
        assert_eq!(body["key"], "hashed-token");
        assert_eq!(body["budget_duration"], "30d");
        assert!(body.get("spend").is_none());
        assert!(body.get("config").is_none());
    }

    #[test]
    fn test_key_entry_serializes_basic_fallback() {
        let entry = KeyEntry::Basic {
            key: "sk-abc".to_string(),
        };
        assert_eq!(serde_json::to_value(entry).unwrap(), json!({ "key": "sk-abc" }));
    }

    #[test]
    fn test_created_key_fills_missing_fields() {
        let key: CreatedKey = serde_json::from_value(json!({
            "key": "sk-new",
            "metadata": null,
            "models": null
        }))
        .unwrap();
        let value = serde_json::to_value(key).unwrap();
        assert_eq!(value["key"], "sk-new");
        assert_eq!(value["metadata"], json!({}));
        assert_eq!(value["models"], json!([]));
        assert_eq!(value["spend"], 0.0);
        assert_eq!(value["blocked"], false);
        assert_eq!(value["max_budget"], Value::Null);
    }

    #[test]
    fn test_api_key_from_info() {
        let info: KeyInfoResponse = serde_json::from_value(json!({
            "info": { "key_name": "sk-...abcd", "spend": null, "models": ["gpt-4o"] }
        }))
        .unwrap();
        let key = ApiKey::from_info("token".to_string(), info.info);
        assert_eq!(key.id, "token");
        assert_eq!(key.key.as_deref(), Some("sk-...abcd"));
        assert_eq!(key.spend, 0.0);
        assert_eq!(key.permissions, json!({}));
    }
}
