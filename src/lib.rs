//! giftai - personal assistant backend for chat, image and video requests
//!
//! This library provides configuration, provider clients, the chat and
//! image routers with their fallback rules, and the HTTP API.

pub mod config;
pub mod error;
pub mod providers;
pub mod proxy;
pub mod router;
pub mod video;

pub use config::Config;
pub use error::{Error, Result};
