use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::try_join_all;
use prism_config::GenerationConfig;
use prism_core::{ImageReference, Message, MessageContent, MessageKind};
use prism_images::{ImageHandler, ImageSource};

use crate::conversation::{Conversation, ImageInput, Target, image_input};
use crate::error::PromptError;
use crate::formatter::ProviderFormatter;
use crate::registry::FormatterRegistry;

/// Assembles a conversation into provider request bodies
///
/// Image messages are fetched when added, concurrently when added as a
/// group, and checked against the target provider's contract only when a
/// payload is requested. Stored messages are never rewritten, so the same
/// builder can produce payloads for several providers.
///
/// For use outside an async runtime see [`crate::blocking::PromptBuilder`].
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    conversation: Conversation,
    images: ImageHandler,
}

impl PromptBuilder {
    /// Builder with the default image sources and formatters
    ///
    /// Seeded with an `openai` / `gpt-4o` generation config.
    pub fn new() -> Self {
        Self::with_image_handler(ImageHandler::new())
    }

    /// Builder fetching images through the given handler
    pub fn with_image_handler(images: ImageHandler) -> Self {
        Self {
            conversation: Conversation::new(),
            images,
        }
    }

    /// Append a system message
    pub fn add_system_message(&mut self, text: impl Into<String>) -> &mut Self {
        self.add_message(Message::text(MessageKind::System, text))
    }

    /// Append a user message
    pub fn add_user_message(&mut self, text: impl Into<String>) -> &mut Self {
        self.add_message(Message::text(MessageKind::User, text))
    }

    /// Append an assistant message
    pub fn add_assistant_message(&mut self, text: impl Into<String>) -> &mut Self {
        self.add_message(Message::text(MessageKind::Assistant, text))
    }

    /// Append a function result for the named function
    ///
    /// Providers that identify results by call ID need a `tool_call_id`
    /// extra; build the message with [`Message::with_extra`] and pass it to
    /// [`add_message`](Self::add_message) in that case.
    pub fn add_function_message(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.add_message(Message::text(MessageKind::Function, content).with_extra("name", name.into()))
    }

    /// Append a prepared message
    pub fn add_message(&mut self, message: Message) -> &mut Self {
        self.conversation.push(message);
        self
    }

    /// Fetch an image and append it
    ///
    /// Nothing is appended when the fetch fails.
    pub async fn add_image_message(&mut self, reference: impl Into<String>) -> Result<&mut Self, PromptError> {
        let reference = reference.into();
        let data = self.images.fetch_async(&reference).await?;

        self.conversation.push(prefetched_image(reference, data));
        Ok(self)
    }

    /// Fetch several images concurrently and append them in the given order
    ///
    /// Nothing is appended unless every fetch succeeds.
    pub async fn add_image_messages<I, S>(&mut self, references: I) -> Result<&mut Self, PromptError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let references: Vec<String> = references.into_iter().map(Into::into).collect();

        let images = &self.images;
        let fetched = try_join_all(references.iter().map(|reference| images.fetch_async(reference))).await?;

        tracing::debug!(count = references.len(), "fetched image batch");

        for (reference, data) in references.into_iter().zip(fetched) {
            self.conversation.push(prefetched_image(reference, data));
        }
        Ok(self)
    }

    /// Store a generation config under its `provider` name, replacing any previous one
    pub fn add_config(&mut self, config: GenerationConfig) -> Result<&mut Self, PromptError> {
        self.conversation.add_config(config)?;
        Ok(self)
    }

    /// Generation config stored for a provider
    pub fn get_config(&self, provider: &str) -> Option<&GenerationConfig> {
        self.conversation.get_config(provider)
    }

    /// Serialized request body for a provider
    ///
    /// Fails if the provider has no config or formatter, if any image cannot
    /// be fetched or violates the provider's contract, or if a message does
    /// not fit the provider's structure.
    pub async fn get_prompt_for(&self, provider: &str) -> Result<String, PromptError> {
        let target = self.conversation.target(provider)?;

        let resolved = try_join_all(
            self.conversation
                .messages()
                .iter()
                .map(|message| self.resolve(message, &target)),
        )
        .await?;

        target.render(&resolved)
    }

    /// Remove every message; configs, sources, and formatters are kept
    pub fn clear(&mut self) -> &mut Self {
        self.conversation.clear();
        self
    }

    /// Stored messages in insertion order
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Append an image source after the existing ones
    pub fn register_source(&mut self, source: Arc<dyn ImageSource>) -> &mut Self {
        self.images.register_source(source);
        self
    }

    /// Register or replace the formatter for a provider
    pub fn register_helper(&mut self, name: impl Into<String>, formatter: Arc<dyn ProviderFormatter>) -> &mut Self {
        self.conversation.register_helper(name, formatter);
        self
    }

    /// Registered formatters
    pub const fn formatters(&self) -> &FormatterRegistry {
        self.conversation.formatters()
    }

    async fn resolve(&self, message: &Message, target: &Target<'_>) -> Result<Message, PromptError> {
        match image_input(message) {
            None => Ok(message.clone()),
            Some(ImageInput::Fetched { reference, data }) => target.resolve_image(message, reference, data),
            Some(ImageInput::Unfetched { reference }) => {
                let data = self.images.fetch_async(reference).await?;
                target.resolve_image(message, reference, data)
            }
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn prefetched_image(reference: String, data: Bytes) -> Message {
    Message::new(
        MessageKind::Image,
        MessageContent::ImageRef(ImageReference::prefetched(reference, data)),
    )
}
