use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::PromptError;
use crate::formatter::ProviderFormatter;
use crate::formatter::anthropic::{self, AnthropicFormatter};
use crate::formatter::gemini::{self, GeminiFormatter};
use crate::formatter::openai::{self, OpenAiFormatter};

/// Provider name to formatter lookup
///
/// Seeded with the `openai`, `anthropic`, and `gemini` formatters. Entries
/// can be replaced but never removed; iteration lists built-ins first, then
/// custom providers in registration order.
#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: IndexMap<String, Arc<dyn ProviderFormatter>>,
}

impl FormatterRegistry {
    /// Registry holding the built-in formatters
    pub fn new() -> Self {
        let mut formatters: IndexMap<String, Arc<dyn ProviderFormatter>> = IndexMap::new();
        formatters.insert(openai::NAME.to_owned(), Arc::new(OpenAiFormatter::new()));
        formatters.insert(anthropic::NAME.to_owned(), Arc::new(AnthropicFormatter::new()));
        formatters.insert(gemini::NAME.to_owned(), Arc::new(GeminiFormatter::new()));
        Self { formatters }
    }

    /// Insert a formatter, replacing any existing entry under the same name
    ///
    /// A replaced entry keeps its position in the listing.
    pub fn register_helper(&mut self, name: impl Into<String>, formatter: Arc<dyn ProviderFormatter>) {
        let name = name.into();
        if self.formatters.insert(name.clone(), formatter).is_some() {
            tracing::debug!(provider = %name, "replaced provider formatter");
        } else {
            tracing::debug!(provider = %name, "registered provider formatter");
        }
    }

    /// Formatter registered under `name`
    pub fn get_helper(&self, name: &str) -> Result<Arc<dyn ProviderFormatter>, PromptError> {
        self.formatters
            .get(name)
            .cloned()
            .ok_or_else(|| PromptError::ProviderNotFound {
                provider: name.to_owned(),
            })
    }

    /// Registered provider names usable as `get_prompt_for` targets
    pub fn list_supported_models(&self) -> Vec<&str> {
        self.get_supported_providers()
    }

    /// Registered provider names
    pub fn get_supported_providers(&self) -> Vec<&str> {
        self.formatters.keys().map(String::as_str).collect()
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("providers", &self.get_supported_providers())
            .finish()
    }
}
