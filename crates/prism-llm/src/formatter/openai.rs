//! `OpenAI` chat completions formatter

use prism_config::{GenerationConfig, ImageContract};
use prism_core::{ImageFormat, Message, MessageContent, MessageKind};

use super::{ProviderFormatter, require_text, to_body};
use crate::error::PromptError;
use crate::protocol::openai::{
    DEFAULT_BATCH_URL, OpenAiBatchLine, OpenAiContent, OpenAiContentPart, OpenAiImageUrl, OpenAiJsonSchema,
    OpenAiMessage, OpenAiRequest, OpenAiResponseFormat,
};

/// Registry key for the built-in formatter
pub const NAME: &str = "openai";

/// Schema name sent with `json_schema` structured output
const SCHEMA_NAME: &str = "response";

/// Formats chat completion requests for `OpenAI`
#[derive(Debug, Clone)]
pub struct OpenAiFormatter {
    contract: ImageContract,
}

impl OpenAiFormatter {
    /// Formatter with the standard `OpenAI` image limits
    pub fn new() -> Self {
        Self {
            contract: ImageContract::new(true, 20_000_000, [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif]),
        }
    }

    fn build_request(&self, messages: &[Message], config: &GenerationConfig) -> Result<OpenAiRequest, PromptError> {
        let messages = messages
            .iter()
            .enumerate()
            .map(|(index, message)| self.convert_message(index, message))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OpenAiRequest {
            model: config.model.clone(),
            messages,
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
            response_format: response_format(config),
        })
    }

    fn convert_message(&self, index: usize, message: &Message) -> Result<OpenAiMessage, PromptError> {
        if let MessageContent::Image(image) = &message.content {
            return Ok(OpenAiMessage {
                role: message.role.clone(),
                content: OpenAiContent::Parts(vec![OpenAiContentPart::ImageUrl {
                    image_url: OpenAiImageUrl { url: image.data_uri() },
                }]),
                name: None,
                tool_call_id: None,
            });
        }

        let text = require_text(self.name(), index, message)?.to_owned();

        if message.kind == MessageKind::Function {
            return function_message(self.name(), index, message, text);
        }
        if message.kind == MessageKind::Image {
            return Err(PromptError::format(self.name(), index, "image message was not resolved"));
        }

        Ok(OpenAiMessage {
            role: message.role.clone(),
            content: OpenAiContent::Text(text),
            name: message.extra_str("name").map(str::to_owned),
            tool_call_id: None,
        })
    }
}

impl Default for OpenAiFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderFormatter for OpenAiFormatter {
    fn name(&self) -> &str {
        NAME
    }

    fn image_contract(&self) -> &ImageContract {
        &self.contract
    }

    fn format_prompt(&self, messages: &[Message], config: &GenerationConfig) -> Result<String, PromptError> {
        let body = self.build_request(messages, config)?;

        if !config.is_batch {
            return to_body(&body);
        }

        let url = if config.url.is_empty() {
            DEFAULT_BATCH_URL.to_owned()
        } else {
            config.url.clone()
        };

        to_body(&OpenAiBatchLine {
            custom_id: config.batch_id(),
            method: config.method.clone(),
            url,
            body,
        })
    }
}

/// Tool result (with `tool_call_id`) or legacy function result (with `name`)
fn function_message(provider: &str, index: usize, message: &Message, text: String) -> Result<OpenAiMessage, PromptError> {
    if let Some(tool_call_id) = message.extra_str("tool_call_id") {
        return Ok(OpenAiMessage {
            role: "tool".to_owned(),
            content: OpenAiContent::Text(text),
            name: None,
            tool_call_id: Some(tool_call_id.to_owned()),
        });
    }

    if let Some(name) = message.extra_str("name") {
        return Ok(OpenAiMessage {
            role: "function".to_owned(),
            content: OpenAiContent::Text(text),
            name: Some(name.to_owned()),
            tool_call_id: None,
        });
    }

    Err(PromptError::format(
        provider,
        index,
        "function message needs a tool_call_id or name",
    ))
}

fn response_format(config: &GenerationConfig) -> Option<OpenAiResponseFormat> {
    if !config.json_response {
        return None;
    }

    Some(match &config.json_schema {
        Some(schema) => OpenAiResponseFormat::JsonSchema {
            json_schema: OpenAiJsonSchema {
                name: SCHEMA_NAME.to_owned(),
                schema: schema.clone(),
            },
        },
        None => OpenAiResponseFormat::JsonObject,
    })
}
