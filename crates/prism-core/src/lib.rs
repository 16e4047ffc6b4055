//! Shared types for Prism
//!
//! Conversation messages, image formats, and the error classification used
//! across the image, config, and formatting crates.

#![allow(clippy::must_use_candidate)]

mod error;
mod format;
mod message;

pub use error::{Classify, ErrorKind};
pub use format::ImageFormat;
pub use message::{ImageReference, Message, MessageContent, MessageKind, ResolvedImage, TransportForm};
