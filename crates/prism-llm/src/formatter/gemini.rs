//! Gemini `generateContent` formatter

use prism_config::{GenerationConfig, ImageContract};
use prism_core::{ImageFormat, Message, MessageContent, MessageKind};
use serde_json::{Map, Value};

use super::{ProviderFormatter, require_text, to_body};
use crate::error::PromptError;
use crate::protocol::google::{
    GoogleBatchLine, GoogleContent, GoogleFunctionResponse, GoogleGenerationConfig, GoogleInlineData, GooglePart,
    GoogleRequest,
};

/// Registry key for the built-in formatter
pub const NAME: &str = "gemini";

/// Formats `generateContent` requests for Gemini
///
/// Gemini accepts raw image bytes, so images skip base64 encoding until
/// the body is serialized.
#[derive(Debug, Clone)]
pub struct GeminiFormatter {
    contract: ImageContract,
}

impl GeminiFormatter {
    /// Formatter with the standard Gemini image limits
    pub fn new() -> Self {
        Self {
            contract: ImageContract::new(
                false,
                10_000_000,
                [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Webp, ImageFormat::Heic],
            ),
        }
    }

    fn build_request(&self, messages: &[Message], config: &GenerationConfig) -> Result<GoogleRequest, PromptError> {
        let mut system_parts = Vec::new();
        let mut contents = Vec::with_capacity(messages.len());

        for (index, message) in messages.iter().enumerate() {
            if message.kind == MessageKind::System {
                let text = require_text(self.name(), index, message)?;
                system_parts.push(GooglePart::Text(text.to_owned()));
            } else {
                contents.push(self.convert_message(index, message)?);
            }
        }

        let structured = config.json_response;

        Ok(GoogleRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then_some(GoogleContent {
                role: None,
                parts: system_parts,
            }),
            generation_config: GoogleGenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                max_output_tokens: config.max_tokens,
                response_mime_type: structured.then_some("application/json"),
                response_schema: config.json_schema.clone().filter(|_| structured),
            },
        })
    }

    fn convert_message(&self, index: usize, message: &Message) -> Result<GoogleContent, PromptError> {
        if let MessageContent::Image(image) = &message.content {
            return Ok(GoogleContent {
                role: Some(gemini_role(message)),
                parts: vec![GooglePart::InlineData(GoogleInlineData {
                    mime_type: image.media_type(),
                    data: image.data.as_base64().into_owned(),
                })],
            });
        }

        let text = require_text(self.name(), index, message)?;

        match message.kind {
            MessageKind::Function => {
                let Some(name) = message.extra_str("name") else {
                    return Err(PromptError::format(self.name(), index, "function message needs a name"));
                };

                Ok(GoogleContent {
                    role: Some("function".to_owned()),
                    parts: vec![GooglePart::FunctionResponse(GoogleFunctionResponse {
                        name: name.to_owned(),
                        response: function_response(text),
                    })],
                })
            }
            MessageKind::Image => Err(PromptError::format(self.name(), index, "image message was not resolved")),
            MessageKind::System | MessageKind::User | MessageKind::Assistant => Ok(GoogleContent {
                role: Some(gemini_role(message)),
                parts: vec![GooglePart::Text(text.to_owned())],
            }),
        }
    }
}

impl Default for GeminiFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderFormatter for GeminiFormatter {
    fn name(&self) -> &str {
        NAME
    }

    fn image_contract(&self) -> &ImageContract {
        &self.contract
    }

    fn format_prompt(&self, messages: &[Message], config: &GenerationConfig) -> Result<String, PromptError> {
        let request = self.build_request(messages, config)?;

        if config.is_batch {
            to_body(&GoogleBatchLine {
                key: config.batch_id(),
                request,
            })
        } else {
            to_body(&request)
        }
    }
}

/// Gemini calls the assistant `model`
fn gemini_role(message: &Message) -> String {
    if message.kind == MessageKind::Assistant || message.role == "assistant" {
        "model".to_owned()
    } else {
        message.role.clone()
    }
}

/// Function output as a JSON object; anything else is wrapped under `result`
fn function_response(text: &str) -> Value {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => return Value::Object(object),
        Ok(other) => other,
        Err(_) => Value::String(text.to_owned()),
    };

    let mut wrapped = Map::new();
    wrapped.insert("result".to_owned(), value);
    Value::Object(wrapped)
}
