//! Provider payload assembly for Prism
//!
//! Turns an ordered conversation of text, image, and function messages into
//! the request body a specific LLM provider expects (`OpenAI`, Anthropic,
//! Gemini, or a custom formatter). Images are fetched through
//! [`prism_images`] and checked against each provider's contract.
//!
//! [`PromptBuilder`] is the async entry point; [`blocking::PromptBuilder`]
//! offers the same operations for synchronous callers.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod blocking;
mod builder;
mod conversation;
pub mod error;
pub mod formatter;
pub mod protocol;
mod registry;

pub use builder::PromptBuilder;
pub use conversation::DEFAULT_MODEL;
pub use error::PromptError;
pub use formatter::ProviderFormatter;
pub use formatter::anthropic::AnthropicFormatter;
pub use formatter::gemini::GeminiFormatter;
pub use formatter::openai::OpenAiFormatter;
pub use registry::FormatterRegistry;
