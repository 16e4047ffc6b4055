use strum::{Display, IntoStaticStr};

/// Classification shared by every error Prism surfaces to callers
///
/// Concrete error types live in their owning crates; this is the common
/// vocabulary callers match on without depending on each crate's enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// I/O, network, or storage failure while fetching an image
    ImageSource,
    /// Image reference could not be parsed (e.g. `s3://bucket` without a key)
    InvalidReference,
    /// No registered image source accepts the reference
    UnresolvableReference,
    /// Image exceeds the provider's size ceiling or has an unsupported format
    ContractViolation,
    /// Provider has no generation config
    Configuration,
    /// Provider has no registered formatter
    ProviderNotFound,
    /// Message content does not fit the provider's payload shape
    ProviderFormat,
    /// Generic input-shape violation
    Validation,
    /// Unexpected internal failure
    Internal,
}

impl ErrorKind {
    /// Machine-readable identifier (e.g. `contract_violation`)
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Whether the failure stems from caller input rather than the environment
    pub const fn is_caller_fault(self) -> bool {
        !matches!(self, Self::ImageSource | Self::Internal)
    }
}

/// Trait for domain errors that expose a shared [`ErrorKind`]
///
/// Implemented by each crate's error type so the CLI and embedding
/// applications can report failures uniformly.
pub trait Classify: std::error::Error {
    /// Kind of failure
    fn kind(&self) -> ErrorKind;

    /// Whether retrying with different input could succeed
    fn is_caller_fault(&self) -> bool {
        self.kind().is_caller_fault()
    }
}
