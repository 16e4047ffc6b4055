use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// HTTP method used when none is configured
pub const DEFAULT_METHOD: &str = "POST";

/// Generation parameters for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Provider name this config applies to
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Maximum tokens to generate
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling threshold
    #[serde(default)]
    pub top_p: Option<f64>,
    /// Request structured JSON output
    pub json_response: bool,
    /// JSON Schema the response must follow
    #[serde(default)]
    pub json_schema: Option<Value>,
    /// Wrap the body in the provider's batch envelope
    pub is_batch: bool,
    /// HTTP method recorded in batch envelopes
    pub method: String,
    /// Endpoint path recorded in batch envelopes (empty selects the provider default)
    pub url: String,
    /// Identifier for the batch line
    #[serde(default)]
    pub custom_id: Option<String>,
}

impl GenerationConfig {
    /// Config with neutral defaults
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            top_p: None,
            json_response: false,
            json_schema: None,
            is_batch: false,
            method: DEFAULT_METHOD.to_owned(),
            url: String::new(),
            custom_id: None,
        }
    }

    /// Set the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the token limit
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the nucleus sampling threshold
    #[must_use]
    pub const fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Request JSON output, optionally constrained by a schema
    #[must_use]
    pub fn with_json_response(mut self, schema: Option<Value>) -> Self {
        self.json_response = true;
        self.json_schema = schema;
        self
    }

    /// Emit batch lines with the given method and endpoint
    #[must_use]
    pub fn with_batch(mut self, method: impl Into<String>, url: impl Into<String>) -> Self {
        self.is_batch = true;
        self.method = method.into();
        self.url = url.into();
        self
    }

    /// Set the batch line identifier
    #[must_use]
    pub fn with_custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = Some(custom_id.into());
        self
    }

    /// Batch line identifier, derived from provider and model when unset
    pub fn batch_id(&self) -> String {
        self.custom_id
            .clone()
            .unwrap_or_else(|| format!("{}-{}", self.provider, self.model))
    }

    /// Check field constraints
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an empty provider or model, an
    /// out-of-range sampling parameter, or a `json_schema` that is not a
    /// compilable JSON Schema object.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.trim().is_empty() {
            return Err(ConfigError::invalid("provider", "must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid("model", "must not be empty"));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConfigError::invalid("temperature", "must be a non-negative number"));
        }
        if let Some(top_p) = self.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            return Err(ConfigError::invalid("top_p", "must be between 0 and 1"));
        }
        if self.method.trim().is_empty() {
            return Err(ConfigError::invalid("method", "must not be empty"));
        }
        if let Some(schema) = &self.json_schema {
            validate_schema(schema)?;
        }
        Ok(())
    }

    /// Encode into a plain map; optional fields appear as `null` when unset
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // Struct with string keys always serializes to an object
            _ => Map::new(),
        }
    }

    /// Decode from a plain map and validate
    ///
    /// Required fields must be present; only `max_tokens`, `top_p`,
    /// `json_schema`, and `custom_id` may be omitted.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(Value::Object(map)).map_err(|source| ConfigError::Decode {
            target: "generation config",
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Ensure a schema is an object that compiles as JSON Schema
fn validate_schema(schema: &Value) -> Result<(), ConfigError> {
    if !schema.is_object() {
        return Err(ConfigError::invalid("json_schema", "must be a JSON object"));
    }
    jsonschema::validator_for(schema).map_err(|e| ConfigError::invalid("json_schema", e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn round_trip_minimal() {
        let config = GenerationConfig::new("openai", "gpt-4o");
        let decoded = GenerationConfig::from_map(config.to_map()).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn round_trip_every_field() {
        let config = GenerationConfig::new("anthropic", "claude-sonnet-4-20250514")
            .with_temperature(0.7)
            .with_max_tokens(1024)
            .with_top_p(0.9)
            .with_json_response(Some(json!({
                "type": "object",
                "properties": {"answer": {"type": "string"}},
                "required": ["answer"]
            })))
            .with_batch("POST", "/v1/messages")
            .with_custom_id("row-17");

        let map = config.to_map();
        assert_eq!(map["custom_id"], "row-17");
        assert_eq!(GenerationConfig::from_map(map).unwrap(), config);
    }

    #[test]
    fn unset_optionals_encode_as_null() {
        let map = GenerationConfig::new("gemini", "gemini-2.0-flash").to_map();
        assert_eq!(map["max_tokens"], Value::Null);
        assert_eq!(map["json_schema"], Value::Null);
        assert_eq!(map.len(), 11);
    }

    #[test]
    fn decode_requires_mandatory_fields() {
        for field in ["provider", "model", "temperature", "json_response", "is_batch", "method", "url"] {
            let mut map = GenerationConfig::new("openai", "gpt-4o").to_map();
            map.remove(field);
            let err = GenerationConfig::from_map(map).unwrap_err();
            assert!(err.to_string().contains(field), "missing {field}: {err}");
        }
    }

    #[test]
    fn decode_tolerates_absent_optionals() {
        let mut map = GenerationConfig::new("openai", "gpt-4o").to_map();
        map.remove("top_p");
        map.remove("custom_id");
        assert!(GenerationConfig::from_map(map).is_ok());
    }

    #[test]
    fn non_object_schema_is_rejected() {
        let config = GenerationConfig::new("openai", "gpt-4o").with_json_response(Some(json!("string")));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "json_schema", .. }));
    }

    #[test]
    fn out_of_range_top_p_is_rejected() {
        let config = GenerationConfig::new("openai", "gpt-4o").with_top_p(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn batch_id_falls_back_to_provider_and_model() {
        assert_eq!(GenerationConfig::new("openai", "gpt-4o").batch_id(), "openai-gpt-4o");
        assert_eq!(
            GenerationConfig::new("openai", "gpt-4o").with_custom_id("x").batch_id(),
            "x"
        );
    }
}
