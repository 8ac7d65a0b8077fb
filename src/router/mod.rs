//! Router module for provider selection.
//!
//! This module decides which upstream provider serves a request:
//! - Chat: preferred provider first, the other as fallback
//! - Images: Freepik first, pollinations.ai URL as universal fallback
//! - Persona prompt conditioning by calendar date

mod chat;
pub mod fallback;
mod image;
pub mod prompt;

pub use chat::{technical_snag, ChatResult, ChatRouter, ChatSlot, NO_CHAT_KEYS, SECONDARY_MISSING};
pub use image::{ImageResult, ImageRouter, ImageSource, PollinationsUrl};
