//! `OpenAI` chat completion API wire format types

use serde::Serialize;
use serde_json::Value;

/// Endpoint recorded in batch lines when the config leaves `url` empty
pub const DEFAULT_BATCH_URL: &str = "/v1/chat/completions";

/// `OpenAI` chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<OpenAiMessage>,
    /// Sampling temperature
    pub temperature: f64,
    /// Nucleus sampling threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Structured output mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<OpenAiResponseFormat>,
}

/// `OpenAI` message within a request
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiMessage {
    /// Message role
    pub role: String,
    /// Content (string or array of content parts)
    pub content: OpenAiContent,
    /// Participant or function name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool call ID this message responds to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// `OpenAI` content can be a string or array of content parts
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OpenAiContent {
    /// Plain text content
    Text(String),
    /// Array of content parts
    Parts(Vec<OpenAiContentPart>),
}

/// Individual content part in an `OpenAI` message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAiContentPart {
    /// Image content via URL
    ImageUrl {
        /// Image URL
        image_url: OpenAiImageUrl,
    },
}

/// Image URL part for `OpenAI`
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiImageUrl {
    /// Base64 data URI
    pub url: String,
}

/// `response_format` request field
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAiResponseFormat {
    /// Any valid JSON object
    JsonObject,
    /// JSON matching a schema
    JsonSchema {
        /// Named JSON Schema
        json_schema: OpenAiJsonSchema,
    },
}

/// Named schema for structured output
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiJsonSchema {
    /// Schema name
    pub name: String,
    /// JSON Schema document
    pub schema: Value,
}

/// One line of a batch input file
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiBatchLine {
    /// Caller-chosen identifier echoed in the batch output
    pub custom_id: String,
    /// HTTP method
    pub method: String,
    /// Endpoint path
    pub url: String,
    /// Request body
    pub body: OpenAiRequest,
}
