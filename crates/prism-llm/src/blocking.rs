//! Blocking prompt builder
//!
//! Same operations as [`crate::PromptBuilder`], with every image fetch
//! blocking the calling thread. Must not be used from inside an async
//! runtime: HTTP and S3 fetches refuse to run there.

use std::sync::Arc;

use prism_config::GenerationConfig;
use prism_core::{Message, MessageKind};
use prism_images::{ImageHandler, ImageSource};

use crate::conversation::{Conversation, ImageInput, Target, image_input};
use crate::error::PromptError;
use crate::formatter::ProviderFormatter;
use crate::registry::FormatterRegistry;

/// Assembles a conversation into provider request bodies, blocking on fetches
///
/// Image references are stored as given and fetched each time a payload is
/// requested.
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
    pub fn add_function_message(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.add_message(Message::text(MessageKind::Function, content).with_extra("name", name.into()))
    }

    /// Append a prepared message
    pub fn add_message(&mut self, message: Message) -> &mut Self {
        self.conversation.push(message);
        self
    }

    /// Append an image reference; it is fetched when a payload is requested
    pub fn add_image_message(&mut self, reference: impl Into<String>) -> &mut Self {
        self.add_message(Message::image(reference))
    }

    /// Append several image references in the given order
    pub fn add_image_messages<I, S>(&mut self, references: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for reference in references {
            self.add_image_message(reference);
        }
        self
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
    /// Images are fetched in message order; the first failure aborts the call.
    pub fn get_prompt_for(&self, provider: &str) -> Result<String, PromptError> {
        let target = self.conversation.target(provider)?;

        let resolved = self
            .conversation
            .messages()
            .iter()
            .map(|message| self.resolve(message, &target))
            .collect::<Result<Vec<_>, _>>()?;

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

    fn resolve(&self, message: &Message, target: &Target<'_>) -> Result<Message, PromptError> {
        match image_input(message) {
            None => Ok(message.clone()),
            Some(ImageInput::Fetched { reference, data }) => target.resolve_image(message, reference, data),
            Some(ImageInput::Unfetched { reference }) => {
                let data = self.images.fetch(reference)?;
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
