//! Configuration for Prism
//!
//! Value types exchanged with callers (`GenerationConfig`, `ImageContract`)
//! and the TOML file layout loaded by the CLI.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod contract;
mod env;
mod error;
mod generation;
pub mod images;
mod loader;
pub mod providers;
pub mod telemetry;

use serde::Deserialize;

pub use contract::ImageContract;
pub use env::ExpandError;
pub use error::ConfigError;
pub use generation::{DEFAULT_METHOD, GenerationConfig};
pub use images::*;
pub use providers::*;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level Prism configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Generation settings keyed by provider name
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Image source settings
    #[serde(default)]
    pub images: ImagesConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
