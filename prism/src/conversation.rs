//! Conversation files read by the CLI
//!
//! ```toml
//! [[messages]]
//! kind = "system"
//! content = "Describe the image."
//!
//! [[messages]]
//! kind = "image"
//! content = "s3://bucket/photo.png"
//!
//! [[messages]]
//! kind = "function"
//! content = '{"temperature": 21}'
//! extra = { name = "get_weather" }
//! ```

use std::path::Path;

use prism_core::{Message, MessageKind};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Parsed conversation file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationFile {
    #[serde(default)]
    pub messages: Vec<Entry>,
}

/// One `[[messages]]` table
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    pub kind: MessageKind,
    /// Text, function result, or image reference
    pub content: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub extra: Map<String, Value>,
}

/// What the builder should do with an entry
#[derive(Debug, PartialEq)]
pub enum Turn {
    Message(Message),
    Image(String),
}

impl ConversationFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read conversation file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse conversation: {e}"))
    }

    /// Builder turns in file order
    pub fn turns(self) -> anyhow::Result<Vec<Turn>> {
        self.messages
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.into_turn().map_err(|e| anyhow::anyhow!("message {index}: {e}")))
            .collect()
    }
}

impl Entry {
    fn into_turn(self) -> anyhow::Result<Turn> {
        if self.kind != MessageKind::Image {
            let mut message = Message::text(self.kind, self.content);
            if let Some(role) = self.role {
                message = message.with_role(role);
            }
            message.extra = self.extra;
            return Ok(Turn::Message(message));
        }

        if self.role.is_some() || !self.extra.is_empty() {
            anyhow::bail!("image messages take only a reference");
        }
        Ok(Turn::Image(self.content))
    }
}
