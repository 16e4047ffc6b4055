use prism_config::ConfigError;
use prism_core::{Classify, ErrorKind};
use prism_images::ImageError;
use thiserror::Error;

/// Errors that can occur while assembling a provider payload
#[derive(Debug, Error)]
pub enum PromptError {
    /// No generation config is stored for the provider
    #[error("no generation config for provider: {provider}")]
    Configuration { provider: String },

    /// No formatter is registered under the provider name
    #[error("provider not found: {provider}")]
    ProviderNotFound { provider: String },

    /// A message cannot be expressed in the provider's request structure
    #[error("cannot format message {index} for {provider}: {reason}")]
    ProviderFormat {
        /// Provider being formatted for
        provider: String,
        /// Position of the offending message
        index: usize,
        /// What is incompatible
        reason: String,
    },

    /// Generation config failed validation
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// Image could not be fetched or violates the provider contract
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Payload could not be serialized
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PromptError {
    pub(crate) fn format(provider: &str, index: usize, reason: impl Into<String>) -> Self {
        Self::ProviderFormat {
            provider: provider.to_owned(),
            index,
            reason: reason.into(),
        }
    }
}

impl Classify for PromptError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::ProviderNotFound { .. } => ErrorKind::ProviderNotFound,
            Self::ProviderFormat { .. } => ErrorKind::ProviderFormat,
            Self::InvalidConfig(e) => e.kind(),
            Self::Image(e) => e.kind(),
            Self::Serialize(_) => ErrorKind::Internal,
        }
    }
}
