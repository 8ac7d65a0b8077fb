//! Upstream provider clients.
//!
//! Each provider sits behind a small trait so the routers can be exercised
//! with in-process fakes. The concrete clients speak HTTP through a shared
//! `reqwest::Client`.

mod freepik;
mod gemini;
mod groq;

pub use freepik::FreepikClient;
pub use gemini::GeminiClient;
pub use groq::GroqClient;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Sampling temperature sent with every chat completion.
pub const TEMPERATURE: f32 = 0.7;

/// Output token cap sent with every chat completion.
pub const MAX_TOKENS: u32 = 2048;

/// A single-turn chat prompt: persona instructions plus the user's message.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    pub system: String,
    pub message: String,
}

impl ChatPrompt {
    /// System and user text folded into one block, for providers that take a
    /// single user turn.
    pub fn combined(&self) -> String {
        format!("{}\n\nUser Message: {}", self.system, self.message)
    }
}

/// A chat completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Display name used in logs and user-facing messages.
    fn name(&self) -> &'static str;

    /// Produce the assistant's reply text.
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String>;
}

/// Image payload shapes a provider may hand back.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedImage {
    /// Base64-encoded PNG bytes
    Inline(String),
    /// Remote URL of the rendered image
    Url(String),
}

/// An image generation backend.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &str) -> Result<GeneratedImage>;
}

/// Turn a non-success upstream status into `Error::Provider` carrying the body.
async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = %status, provider = provider, "Provider returned error status");
    Err(Error::Provider {
        provider,
        status: status.as_u16(),
        body,
    })
}
