//! Google Generative Language API wire format types

use serde::Serialize;
use serde_json::Value;

/// Google `generateContent` request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRequest {
    /// Conversation contents
    pub contents: Vec<GoogleContent>,
    /// System instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GoogleContent>,
    /// Generation configuration
    pub generation_config: GoogleGenerationConfig,
}

/// Google content object containing role and parts
#[derive(Debug, Clone, Serialize)]
pub struct GoogleContent {
    /// Role ("user", "model", or "function")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    pub parts: Vec<GooglePart>,
}

/// Individual part within a Google content object
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GooglePart {
    /// Text content
    Text(String),
    /// Inline data (e.g. images)
    InlineData(GoogleInlineData),
    /// Function response from the user
    FunctionResponse(GoogleFunctionResponse),
}

/// Inline binary data (images, etc.)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleInlineData {
    /// MIME type (e.g. "image/png")
    pub mime_type: &'static str,
    /// Base64-encoded data
    pub data: String,
}

/// Function response from the user
#[derive(Debug, Clone, Serialize)]
pub struct GoogleFunctionResponse {
    /// Function name
    pub name: String,
    /// Response content as a JSON object
    pub response: Value,
}

/// Generation configuration parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleGenerationConfig {
    /// Sampling temperature
    pub temperature: f64,
    /// Nucleus sampling threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum output tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Response MIME type (`application/json` for structured output)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<&'static str>,
    /// Schema the JSON response must follow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

/// One line of a batch prediction input file
#[derive(Debug, Clone, Serialize)]
pub struct GoogleBatchLine {
    /// Caller-chosen key echoed in the batch output
    pub key: String,
    /// `generateContent` request
    pub request: GoogleRequest,
}
