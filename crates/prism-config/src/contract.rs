use indexmap::IndexSet;
use prism_core::ImageFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Per-provider limits on accepted images
///
/// Immutable once built; each formatter owns exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageContract {
    requires_base64: bool,
    max_size_bytes: u64,
    supported_formats: IndexSet<ImageFormat>,
}

impl ImageContract {
    /// Build a contract; duplicate formats collapse, first occurrence wins
    pub fn new(
        requires_base64: bool,
        max_size_bytes: u64,
        supported_formats: impl IntoIterator<Item = ImageFormat>,
    ) -> Self {
        Self {
            requires_base64,
            max_size_bytes,
            supported_formats: supported_formats.into_iter().collect(),
        }
    }

    /// Whether images must be base64 encoded for transport
    pub const fn requires_base64(&self) -> bool {
        self.requires_base64
    }

    /// Inclusive byte-size ceiling
    pub const fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Accepted formats in declaration order
    pub const fn supported_formats(&self) -> &IndexSet<ImageFormat> {
        &self.supported_formats
    }

    /// Whether a payload of `len` bytes is within the ceiling
    pub fn fits(&self, len: usize) -> bool {
        u64::try_from(len).is_ok_and(|len| len <= self.max_size_bytes)
    }

    /// Whether the format is accepted
    pub fn permits(&self, format: ImageFormat) -> bool {
        self.supported_formats.contains(&format)
    }

    /// Whether the bytes meet both the size and format constraints
    ///
    /// Format is detected from the leading bytes only.
    pub fn validate(&self, image_data: &[u8]) -> bool {
        self.fits(image_data.len()) && ImageFormat::sniff(image_data).is_some_and(|format| self.permits(format))
    }

    /// Like [`ImageContract::validate`], falling back to the reference's
    /// extension when the bytes are not recognised
    ///
    /// Agrees with the check applied when an image is processed.
    pub fn validate_reference(&self, image_data: &[u8], reference: &str) -> bool {
        self.fits(image_data.len()) && ImageFormat::detect(image_data, reference).is_some_and(|format| self.permits(format))
    }

    /// Encode into a plain map
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("requires_base64".to_owned(), Value::Bool(self.requires_base64));
        map.insert("max_size_bytes".to_owned(), Value::from(self.max_size_bytes));
        map.insert(
            "supported_formats".to_owned(),
            Value::Array(
                self.supported_formats
                    .iter()
                    .map(|format| Value::String(format.to_string()))
                    .collect(),
            ),
        );
        map
    }

    /// Decode from a plain map; every field is required
    pub fn from_map(map: Map<String, Value>) -> Result<Self, ConfigError> {
        serde_json::from_value(Value::Object(map)).map_err(|source| ConfigError::Decode {
            target: "image contract",
            source,
        })
    }
}
