//! Provider formatter trait and built-in implementations

pub mod anthropic;
pub mod gemini;
pub mod openai;

use bytes::Bytes;
use prism_config::{GenerationConfig, ImageContract};
use prism_core::{Message, MessageContent, TransportForm};
use serde::Serialize;

use crate::error::PromptError;

/// Trait implemented by each provider's payload formatter
///
/// Formatting is pure: the same messages and config always produce the same
/// body. Every image message handed to `format_prompt` has already been
/// resolved against [`image_contract`](Self::image_contract).
pub trait ProviderFormatter: Send + Sync {
    /// Provider name used in logs and errors
    fn name(&self) -> &str;

    /// Limits applied to images before they reach this formatter
    fn image_contract(&self) -> &ImageContract;

    /// Serialize the conversation into the provider's request body
    fn format_prompt(&self, messages: &[Message], config: &GenerationConfig) -> Result<String, PromptError>;

    /// Transport form for image bytes that passed the contract
    fn encode_image(&self, data: Bytes) -> TransportForm {
        TransportForm::encode(data, self.image_contract().requires_base64())
    }
}

/// Text of a message in a position where the provider only accepts text
pub(crate) fn require_text<'a>(provider: &str, index: usize, message: &'a Message) -> Result<&'a str, PromptError> {
    match &message.content {
        MessageContent::Text(text) => Ok(text),
        MessageContent::Bytes(_) => Err(PromptError::format(provider, index, "raw bytes where text is required")),
        MessageContent::ImageRef(reference) => Err(PromptError::format(
            provider,
            index,
            format!("image {} was not resolved", reference.location),
        )),
        MessageContent::Image(_) => Err(PromptError::format(provider, index, "image where text is required")),
    }
}

/// Serialize a request body or batch line as compact JSON
pub(crate) fn to_body<T: Serialize>(value: &T) -> Result<String, PromptError> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
pub(crate) mod test_support {
    use prism_core::{ImageFormat, Message, MessageContent, MessageKind, ResolvedImage, TransportForm};
    use serde_json::Value;

    /// Resolved PNG image message carrying the given transport form
    pub fn png_message(data: TransportForm) -> Message {
        Message::new(
            MessageKind::Image,
            MessageContent::Image(ResolvedImage {
                format: ImageFormat::Png,
                data,
            }),
        )
    }

    /// Parse a formatter's output for assertions
    pub fn parse(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }
}
