use prism_core::{Classify, ErrorKind};
use thiserror::Error;

/// Errors raised while decoding or validating configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Map did not decode into the target type (missing or mistyped field)
    #[error("failed to decode {target}: {source}")]
    Decode {
        /// Type being decoded
        target: &'static str,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// Value decoded but violates a constraint
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl Classify for ConfigError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
