use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::generation::{DEFAULT_METHOD, GenerationConfig};

/// Generation settings for one provider, as written in the config file
///
/// The table key names the provider; an explicit `provider` field is
/// accepted only when it matches that key.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Optional restatement of the table key
    #[serde(default)]
    pub provider: Option<String>,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: f64,
    /// Maximum tokens to generate
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling threshold
    #[serde(default)]
    pub top_p: Option<f64>,
    /// Request structured JSON output
    #[serde(default)]
    pub json_response: bool,
    /// JSON Schema for structured output
    #[serde(default)]
    pub json_schema: Option<Value>,
    /// Emit batch lines
    #[serde(default)]
    pub is_batch: bool,
    /// HTTP method recorded in batch lines
    #[serde(default = "default_method")]
    pub method: String,
    /// Endpoint recorded in batch lines
    #[serde(default)]
    pub url: String,
    /// Batch line identifier
    #[serde(default)]
    pub custom_id: Option<String>,
}

impl ProviderConfig {
    /// Convert into a `GenerationConfig` keyed by `name`
    pub fn to_generation_config(&self, name: &str) -> GenerationConfig {
        GenerationConfig {
            provider: name.to_owned(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            json_response: self.json_response,
            json_schema: self.json_schema.clone(),
            is_batch: self.is_batch,
            method: self.method.clone(),
            url: self.url.clone(),
            custom_id: self.custom_id.clone(),
        }
    }
}

/// Provider tables keyed by provider name, in file order
pub type ProvidersConfig = IndexMap<String, ProviderConfig>;

fn default_method() -> String {
    DEFAULT_METHOD.to_owned()
}
