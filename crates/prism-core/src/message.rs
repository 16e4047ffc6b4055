use std::borrow::Cow;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::format::ImageFormat;

/// Kind of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    /// System instruction
    System,
    /// User turn
    User,
    /// Assistant turn
    Assistant,
    /// Image supplied by the user
    Image,
    /// Function/tool result
    Function,
}

impl MessageKind {
    /// Role assigned when the caller does not supply one
    pub const fn default_role(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User | Self::Image => "user",
            Self::Assistant => "assistant",
            Self::Function => "function",
        }
    }
}

/// Message in a conversation
///
/// Every field can be replaced independently; the builder never rewrites
/// stored messages during assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Payload
    pub content: MessageContent,
    /// Kind used to pick the provider structure
    pub kind: MessageKind,
    /// Free-form role label (defaults from the kind)
    pub role: String,
    /// Provider-specific extras (e.g. `tool_call_id`, `name`)
    pub extra: Map<String, Value>,
}

impl Message {
    /// Create a message with the kind's default role and no extras
    pub fn new(kind: MessageKind, content: MessageContent) -> Self {
        Self {
            content,
            kind,
            role: kind.default_role().to_owned(),
            extra: Map::new(),
        }
    }

    /// Create a text message
    pub fn text(kind: MessageKind, text: impl Into<String>) -> Self {
        Self::new(kind, MessageContent::Text(text.into()))
    }

    /// Create an unresolved image message
    pub fn image(location: impl Into<String>) -> Self {
        Self::new(MessageKind::Image, MessageContent::ImageRef(ImageReference::new(location)))
    }

    /// Replace the role
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Insert an extra field
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Text content, if the message carries text
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// String-valued extra field
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// Message payload
///
/// Image messages go through two phases: [`MessageContent::ImageRef`] while
/// stored in a builder, and [`MessageContent::Image`] only inside the
/// resolved copy produced for a single assembly call.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    /// Plain text
    Text(String),
    /// Raw bytes
    Bytes(Bytes),
    /// Image reference awaiting resolution
    ImageRef(ImageReference),
    /// Image in its transport form
    Image(ResolvedImage),
}

/// Location of an image, optionally with bytes fetched ahead of assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Local path, `http(s)://` URL, or `s3://bucket/key` URI
    pub location: String,
    /// Bytes fetched when the message was added (async builders only)
    pub prefetched: Option<Bytes>,
}

impl ImageReference {
    /// Reference with nothing fetched yet
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            prefetched: None,
        }
    }

    /// Reference carrying already-fetched bytes
    pub fn prefetched(location: impl Into<String>, data: Bytes) -> Self {
        Self {
            location: location.into(),
            prefetched: Some(data),
        }
    }
}

/// Image validated against a provider contract and encoded for transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Detected format
    pub format: ImageFormat,
    /// Encoded data
    pub data: TransportForm,
}

impl ResolvedImage {
    /// MIME type of the image
    pub const fn media_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// `data:` URI carrying the image inline
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type(), self.data.as_base64())
    }
}

/// Final representation of image bytes inside a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportForm {
    /// Base64 text (standard alphabet, padded)
    Base64(String),
    /// Raw bytes, left for the formatter to embed
    Raw(Bytes),
}

impl TransportForm {
    /// Encode bytes according to a base64 requirement
    pub fn encode(data: Bytes, requires_base64: bool) -> Self {
        if requires_base64 {
            Self::Base64(STANDARD.encode(&data))
        } else {
            Self::Raw(data)
        }
    }

    /// Base64 text, encoding raw bytes on demand
    pub fn as_base64(&self) -> Cow<'_, str> {
        match self {
            Self::Base64(text) => Cow::Borrowed(text),
            Self::Raw(data) => Cow::Owned(STANDARD.encode(data)),
        }
    }

    /// Whether the form is base64 text
    pub const fn is_base64(&self) -> bool {
        matches!(self, Self::Base64(_))
    }
}
