use prism_core::{Classify, ErrorKind};
use thiserror::Error;

/// Boxed cause from an I/O, HTTP, or storage client
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while acquiring or processing an image
#[derive(Debug, Error)]
pub enum ImageError {
    /// Fetch failed in the underlying filesystem, HTTP, or storage client
    #[error("failed to fetch image {reference}: {source}")]
    Source {
        /// Reference being fetched
        reference: String,
        /// Underlying failure
        #[source]
        source: BoxError,
    },

    /// Reference is malformed for the source that claimed it
    #[error("invalid image reference {reference}: {reason}")]
    InvalidReference {
        /// Offending reference
        reference: String,
        /// What is wrong with it
        reason: String,
    },

    /// No registered source accepts the reference
    #[error("no image source can handle {reference}")]
    Unresolvable {
        /// Offending reference
        reference: String,
    },

    /// Image is larger than the provider accepts
    #[error("image {reference} is {size} bytes, exceeding the {max} byte limit")]
    TooLarge {
        /// Offending reference
        reference: String,
        /// Fetched size in bytes
        size: usize,
        /// Provider ceiling in bytes
        max: u64,
    },

    /// Image format is unknown or not accepted by the provider
    #[error("image {reference} has unsupported format {format}")]
    UnsupportedFormat {
        /// Offending reference
        reference: String,
        /// Detected format, or `unknown`
        format: String,
    },
}

impl ImageError {
    pub(crate) fn fetch_failed(reference: &str, source: impl Into<BoxError>) -> Self {
        Self::Source {
            reference: reference.to_owned(),
            source: source.into(),
        }
    }

    pub(crate) fn invalid(reference: &str, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.to_owned(),
            reason: reason.into(),
        }
    }

    /// Whether the image was fetched but rejected by a provider contract
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::TooLarge { .. } | Self::UnsupportedFormat { .. })
    }
}

impl Classify for ImageError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Source { .. } => ErrorKind::ImageSource,
            Self::InvalidReference { .. } => ErrorKind::InvalidReference,
            Self::Unresolvable { .. } => ErrorKind::UnresolvableReference,
            Self::TooLarge { .. } | Self::UnsupportedFormat { .. } => ErrorKind::ContractViolation,
        }
    }
}
