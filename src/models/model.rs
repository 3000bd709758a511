//! Model deployment models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient_f64, lenient_u64, null_default};

/// LLM provider a deployment routes to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAI,
    Anthropic,
    Azure,
    Cohere,
    Google,
    Mistral,
}

impl ModelProvider {
    /// Infer the provider from a model id and its `owned_by` field.
    pub fn detect(id: &str, owned_by: &str) -> Self {
        let id = id.to_lowercase();
        let owned_by = owned_by.to_lowercase();

        if owned_by.contains("anthropic") || id.contains("claude") {
            ModelProvider::Anthropic
        } else if owned_by.contains("google") || id.contains("gemini") {
            ModelProvider::Google
        } else if owned_by.contains("cohere") || id.contains("command") {
            ModelProvider::Cohere
        } else if owned_by.contains("azure") {
            ModelProvider::Azure
        } else if owned_by.contains("mistral") || id.contains("mistral") {
            ModelProvider::Mistral
        } else {
            ModelProvider::OpenAI
        }
    }
}

/// Query parameters for listing models.
#[derive(Debug, Default, Deserialize)]
pub struct ModelListQuery {
    #[serde(default)]
    pub return_wildcard_routes: Option<String>,
}

impl ModelListQuery {
    pub fn wildcard_routes(&self) -> bool {
        self.return_wildcard_routes.as_deref() == Some("true")
    }
}

/// Envelope of `/v1/models` and `/model_group/info`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataList {
    #[serde(default, deserialize_with = "null_default")]
    pub data: Vec<Value>,
}

/// Pricing and limits from `/model_group/info`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelGroupInfo {
    pub model_group: String,
    #[serde(default)]
    pub max_input_tokens: Option<u64>,
    #[serde(default)]
    pub max_output_tokens: Option<u64>,
    #[serde(default)]
    pub input_cost_per_token: Option<f64>,
    #[serde(default)]
    pub output_cost_per_token: Option<f64>,
}

/// Build the dashboard's view of one `/v1/models` entry.
///
/// Computed fields come first; every field of the upstream entry is then copied
/// over them unchanged.
pub fn describe_model(model: &Value, group: Option<&ModelGroupInfo>) -> Value {
    let id = model.get("id").and_then(Value::as_str).unwrap_or_default();
    let owned_by = model
        .get("owned_by")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let mut entry = Map::new();
    entry.insert("model_id".into(), Value::from(id));
    entry.insert(
        "provider".into(),
        serde_json::to_value(ModelProvider::detect(id, owned_by)).unwrap_or(Value::Null),
    );
    entry.insert("display_name".into(), Value::from(id));
    entry.insert("is_active".into(), Value::Bool(true));

    let context_length = model
        .get("context_length")
        .and_then(Value::as_u64)
        .filter(|n| *n > 0);
    let max_tokens = context_length.or_else(|| {
        group.map(|g| {
            g.max_input_tokens
                .unwrap_or(0)
                .saturating_add(g.max_output_tokens.unwrap_or(0))
        })
    });
    if let Some(max_tokens) = max_tokens {
        entry.insert("max_tokens".into(), Value::from(max_tokens));
    }
    if let Some(cost) = group.and_then(|g| g.input_cost_per_token) {
        entry.insert("input_cost_per_token".into(), Value::from(cost));
    }
    if let Some(cost) = group.and_then(|g| g.output_cost_per_token) {
        entry.insert("output_cost_per_token".into(), Value::from(cost));
    }

    if let Some(original) = model.as_object() {
        for (key, value) in original {
            entry.insert(key.clone(), value.clone());
        }
    }

    Value::Object(entry)
}

/// Deployment parameters sent as `litellm_params`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LitellmParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_llm_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub stream_timeout: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_retries: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub input_cost_per_token: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub output_cost_per_token: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub rpm_limit: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub tpm_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_in_pass_through: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_reasoning_content_in_choices: Option<bool>,
}

/// Request body for registering one or more model deployments.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateModelsRequest {
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(flatten)]
    pub params: LitellmParams,
    #[serde(default)]
    pub base_model: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// `model_info` of a new deployment.
#[derive(Debug, Clone, Serialize)]
pub struct NewModelInfo {
    pub id: String,
    pub db_model: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub team_public_model_name: String,
}

/// Upstream body for `/model/new`.
#[derive(Debug, Clone, Serialize)]
pub struct NewModelBody {
    pub model_name: String,
    pub litellm_params: LitellmParams,
    pub model_info: NewModelInfo,
}

impl CreateModelsRequest {
    /// One `/model/new` body per requested model name.
    pub fn bodies(&self) -> Vec<NewModelBody> {
        self.models
            .iter()
            .map(|name| {
                let mut params = self.params.clone();
                params.custom_llm_provider = self.provider.clone();
                params.model = Some(name.clone());
                NewModelBody {
                    model_name: name.clone(),
                    litellm_params: params,
                    model_info: NewModelInfo {
                        id: name.clone(),
                        db_model: false,
                        base_model: self.base_model.clone(),
                        tier: self.tier.clone(),
                        team_id: self.team_id.clone(),
                        team_public_model_name: self
                            .display_name
                            .clone()
                            .filter(|n| !n.is_empty())
                            .unwrap_or_else(|| name.clone()),
                    },
                }
            })
            .collect()
    }
}

/// Outcome of registering one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCreateResult {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Request and upstream body for `/model/{id}/update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateModelRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default)]
    pub litellm_params: LitellmParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_info: Option<Value>,
}

/// Request body for deleting a model deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteModelRequest {
    #[serde(default)]
    pub model_id: Option<String>,
}

/// Upstream body for `/model/delete`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteModelBody {
    pub id: String,
}
