//! JSON request and response bodies of the web client API.

use serde::{Deserialize, Deserializer, Serialize};

/// `model` value used when the client sends none.
pub const DEFAULT_CHAT_MODEL: &str = "groq";

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_chat_model() -> Option<String> {
    Some(DEFAULT_CHAT_MODEL.to_string())
}

/// POST /chat body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// `"groq"` or `"gemini"`. Missing means `"groq"`; `null` names no model.
    #[serde(default = "default_chat_model")]
    pub model: Option<String>,
}

/// POST /chat reply.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /generate_image and POST /generate_video body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,
}

/// POST /generate_image reply.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageResponse {
    pub image_url: String,
    pub response: String,
}

/// POST /generate_video reply.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoResponse {
    pub video_url: String,
    pub response: String,
}
