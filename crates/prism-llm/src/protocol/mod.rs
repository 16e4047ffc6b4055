//! Wire format types for provider request bodies
//!
//! Each module contains serde structs matching the respective provider's
//! JSON request format. Formatters build these from resolved messages and
//! serialize them as the final payload.

pub mod anthropic;
pub mod google;
pub mod openai;
