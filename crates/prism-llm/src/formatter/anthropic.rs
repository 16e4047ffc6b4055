//! Anthropic Messages API formatter

use prism_config::{GenerationConfig, ImageContract};
use prism_core::{ImageFormat, Message, MessageContent, MessageKind};

use super::{ProviderFormatter, require_text, to_body};
use crate::error::PromptError;
use crate::protocol::anthropic::{
    AnthropicBatchRequest, AnthropicContent, AnthropicContentBlock, AnthropicImageSource, AnthropicMessage,
    AnthropicRequest, AnthropicTool, AnthropicToolChoice,
};

/// Registry key for the built-in formatter
pub const NAME: &str = "anthropic";

/// Token limit sent when the config sets none (the API requires one)
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Tool the model is forced to call when a response schema is set
const JSON_TOOL_NAME: &str = "json_response";

/// Appended to the system prompt for schemaless JSON output
const JSON_DIRECTIVE: &str = "Respond only with a single valid JSON object and no other text.";

/// Formats Messages API requests for Anthropic
#[derive(Debug, Clone)]
pub struct AnthropicFormatter {
    contract: ImageContract,
}

impl AnthropicFormatter {
    /// Formatter with the standard Anthropic image limits
    pub fn new() -> Self {
        Self {
            contract: ImageContract::new(true, 40_000_000, [ImageFormat::Png, ImageFormat::Jpeg]),
        }
    }

    fn build_request(&self, messages: &[Message], config: &GenerationConfig) -> Result<AnthropicRequest, PromptError> {
        let mut system = Vec::new();
        let mut converted = Vec::with_capacity(messages.len());

        for (index, message) in messages.iter().enumerate() {
            if message.kind == MessageKind::System {
                system.push(require_text(self.name(), index, message)?.to_owned());
            } else {
                converted.push(self.convert_message(index, message)?);
            }
        }

        let (tools, tool_choice) = match (config.json_response, &config.json_schema) {
            (true, Some(schema)) => (
                Some(vec![AnthropicTool {
                    name: JSON_TOOL_NAME.to_owned(),
                    description: "Respond with structured JSON matching the input schema".to_owned(),
                    input_schema: schema.clone(),
                }]),
                Some(AnthropicToolChoice {
                    choice_type: "tool",
                    name: JSON_TOOL_NAME.to_owned(),
                }),
            ),
            (true, None) => {
                system.push(JSON_DIRECTIVE.to_owned());
                (None, None)
            }
            (false, _) => (None, None),
        };

        Ok(AnthropicRequest {
            model: config.model.clone(),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            messages: converted,
            temperature: config.temperature,
            top_p: config.top_p,
            tools,
            tool_choice,
        })
    }

    fn convert_message(&self, index: usize, message: &Message) -> Result<AnthropicMessage, PromptError> {
        if let MessageContent::Image(image) = &message.content {
            return Ok(AnthropicMessage {
                role: message.role.clone(),
                content: AnthropicContent::Blocks(vec![AnthropicContentBlock::Image {
                    source: AnthropicImageSource {
                        source_type: "base64",
                        media_type: image.media_type(),
                        data: image.data.as_base64().into_owned(),
                    },
                }]),
            });
        }

        let text = require_text(self.name(), index, message)?.to_owned();

        match message.kind {
            MessageKind::Function => {
                let Some(tool_use_id) = message
                    .extra_str("tool_call_id")
                    .or_else(|| message.extra_str("tool_use_id"))
                else {
                    return Err(PromptError::format(
                        self.name(),
                        index,
                        "function message needs a tool_call_id",
                    ));
                };

                Ok(AnthropicMessage {
                    role: "user".to_owned(),
                    content: AnthropicContent::Blocks(vec![AnthropicContentBlock::ToolResult {
                        tool_use_id: tool_use_id.to_owned(),
                        content: text,
                    }]),
                })
            }
            MessageKind::Image => Err(PromptError::format(self.name(), index, "image message was not resolved")),
            MessageKind::System | MessageKind::User | MessageKind::Assistant => Ok(AnthropicMessage {
                role: message.role.clone(),
                content: AnthropicContent::Text(text),
            }),
        }
    }
}

impl Default for AnthropicFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderFormatter for AnthropicFormatter {
    fn name(&self) -> &str {
        NAME
    }

    fn image_contract(&self) -> &ImageContract {
        &self.contract
    }

    fn format_prompt(&self, messages: &[Message], config: &GenerationConfig) -> Result<String, PromptError> {
        let params = self.build_request(messages, config)?;

        if config.is_batch {
            to_body(&AnthropicBatchRequest {
                custom_id: config.batch_id(),
                params,
            })
        } else {
            to_body(&params)
        }
    }
}

#[cfg(test)]
mod tests {
    use prism_core::TransportForm;
    use serde_json::json;

    use super::*;
    use crate::formatter::test_support::{parse, png_message};

    fn config() -> GenerationConfig {
        GenerationConfig::new(NAME, "claude-sonnet-4-20250514")
    }

    #[test]
    fn system_messages_are_lifted_and_joined() {
        let messages = [
            Message::text(MessageKind::System, "first rule"),
            Message::text(MessageKind::User, "hello"),
            Message::text(MessageKind::System, "second rule"),
        ];

        let body = parse(&AnthropicFormatter::new().format_prompt(&messages, &config()).unwrap());

        assert_eq!(body["system"], "first rule\n\nsecond rule");
        assert_eq!(body["messages"], json!([{"role": "user", "content": "hello"}]));
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn images_become_base64_blocks() {
        let messages = [png_message(TransportForm::Base64("AAAA".to_owned()))];
        let body = parse(&AnthropicFormatter::new().format_prompt(&messages, &config()).unwrap());

        assert_eq!(
            body["messages"][0],
            json!({
                "role": "user",
                "content": [{
                    "type": "image",
                    "source": {"type": "base64", "media_type": "image/png", "data": "AAAA"}
                }]
            })
        );
        assert!(body.get("system").is_none());
    }

    #[test]
    fn function_results_are_user_tool_results() {
        let messages = [Message::text(MessageKind::Function, "42").with_extra("tool_call_id", "toolu_1")];
        let body = parse(&AnthropicFormatter::new().format_prompt(&messages, &config()).unwrap());

        assert_eq!(
            body["messages"][0],
            json!({
                "role": "user",
                "content": [{"type": "tool_result", "tool_use_id": "toolu_1", "content": "42"}]
            })
        );
    }

    #[test]
    fn function_without_id_is_rejected() {
        let messages = [Message::text(MessageKind::Function, "42").with_extra("name", "lookup")];
        let err = AnthropicFormatter::new().format_prompt(&messages, &config()).unwrap_err();
        assert!(matches!(err, PromptError::ProviderFormat { .. }));
    }

    #[test]
    fn schema_forces_json_tool() {
        let schema = json!({"type": "object", "properties": {"answer": {"type": "string"}}});
        let config = config().with_json_response(Some(schema.clone())).with_max_tokens(512);
        let body = parse(&AnthropicFormatter::new().format_prompt(&[], &config).unwrap());

        assert_eq!(body["tools"][0]["name"], "json_response");
        assert_eq!(body["tools"][0]["input_schema"], schema);
        assert_eq!(body["tool_choice"], json!({"type": "tool", "name": "json_response"}));
        assert_eq!(body["max_tokens"], 512);
    }

    #[test]
    fn schemaless_json_adds_directive() {
        let messages = [Message::text(MessageKind::System, "be terse")];
        let config = config().with_json_response(None);
        let body = parse(&AnthropicFormatter::new().format_prompt(&messages, &config).unwrap());

        assert_eq!(body["system"], format!("be terse\n\n{JSON_DIRECTIVE}"));
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn batch_request_wraps_params() {
        let config = config().with_batch("POST", "/v1/messages/batches");
        let messages = [Message::text(MessageKind::User, "hi")];
        let line = parse(&AnthropicFormatter::new().format_prompt(&messages, &config).unwrap());

        assert_eq!(line["custom_id"], "anthropic-claude-sonnet-4-20250514");
        assert_eq!(line["params"]["messages"][0]["content"], "hi");
        assert!(line.get("method").is_none());
    }
}
