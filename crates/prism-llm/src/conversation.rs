//! State and assembly steps shared by the async and blocking builders

use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;
use prism_config::GenerationConfig;
use prism_core::{ImageReference, Message, MessageContent, MessageKind, ResolvedImage};
use prism_images::ImageHandler;

use crate::error::PromptError;
use crate::formatter::ProviderFormatter;
use crate::formatter::openai;
use crate::registry::FormatterRegistry;

/// Model configured for the seeded default provider
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Reference reported for image bytes supplied inline
const INLINE_REFERENCE: &str = "<inline>";

/// Messages, generation configs, and formatters
#[derive(Debug, Clone)]
pub(crate) struct Conversation {
    messages: Vec<Message>,
    configs: IndexMap<String, GenerationConfig>,
    formatters: FormatterRegistry,
}

impl Conversation {
    pub(crate) fn new() -> Self {
        let mut configs = IndexMap::new();
        configs.insert(
            openai::NAME.to_owned(),
            GenerationConfig::new(openai::NAME, DEFAULT_MODEL),
        );

        Self {
            messages: Vec::new(),
            configs,
            formatters: FormatterRegistry::new(),
        }
    }

    pub(crate) fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }

    /// Validate and store a config under its own provider name
    pub(crate) fn add_config(&mut self, config: GenerationConfig) -> Result<(), PromptError> {
        config.validate()?;
        tracing::debug!(provider = %config.provider, model = %config.model, "stored generation config");
        self.configs.insert(config.provider.clone(), config);
        Ok(())
    }

    pub(crate) fn get_config(&self, provider: &str) -> Option<&GenerationConfig> {
        self.configs.get(provider)
    }

    pub(crate) const fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub(crate) fn register_helper(&mut self, name: impl Into<String>, formatter: Arc<dyn ProviderFormatter>) {
        self.formatters.register_helper(name, formatter);
    }

    /// Config and formatter for a provider, checked in that order
    pub(crate) fn target(&self, provider: &str) -> Result<Target<'_>, PromptError> {
        let config = self.get_config(provider).ok_or_else(|| PromptError::Configuration {
            provider: provider.to_owned(),
        })?;
        let formatter = self.formatters.get_helper(provider)?;

        Ok(Target { config, formatter })
    }
}

/// Everything needed to produce one provider's payload
pub(crate) struct Target<'a> {
    config: &'a GenerationConfig,
    formatter: Arc<dyn ProviderFormatter>,
}

impl Target<'_> {
    /// Copy of `message` with its image checked and encoded for this provider
    pub(crate) fn resolve_image(&self, message: &Message, reference: &str, data: Bytes) -> Result<Message, PromptError> {
        let format = ImageHandler::check_contract(reference, &data, self.formatter.image_contract())?;

        let mut resolved = message.clone();
        resolved.content = MessageContent::Image(ResolvedImage {
            format,
            data: self.formatter.encode_image(data),
        });
        Ok(resolved)
    }

    /// Serialize resolved messages into the provider body
    pub(crate) fn render(&self, messages: &[Message]) -> Result<String, PromptError> {
        let body = self.formatter.format_prompt(messages, self.config)?;

        tracing::debug!(
            provider = %self.config.provider,
            model = %self.config.model,
            messages = messages.len(),
            bytes = body.len(),
            batch = self.config.is_batch,
            "formatted prompt"
        );

        Ok(body)
    }
}

/// Image bytes a stored message still needs checked, or where to fetch them
pub(crate) enum ImageInput<'a> {
    /// Bytes are already available
    Fetched { reference: &'a str, data: Bytes },
    /// Bytes must be fetched from the reference
    Unfetched { reference: &'a str },
}

/// Classify a stored message; `None` means it passes through unchanged
pub(crate) fn image_input(message: &Message) -> Option<ImageInput<'_>> {
    match &message.content {
        MessageContent::ImageRef(ImageReference {
            location,
            prefetched: Some(data),
        }) => Some(ImageInput::Fetched {
            reference: location,
            data: data.clone(),
        }),
        MessageContent::ImageRef(ImageReference {
            location,
            prefetched: None,
        }) => Some(ImageInput::Unfetched { reference: location }),
        MessageContent::Text(location) if message.kind == MessageKind::Image => {
            Some(ImageInput::Unfetched { reference: location })
        }
        MessageContent::Bytes(data) if message.kind == MessageKind::Image => Some(ImageInput::Fetched {
            reference: INLINE_REFERENCE,
            data: data.clone(),
        }),
        _ => None,
    }
}
