//! Groq client over its OpenAI-compatible chat completions API.

use async_trait::async_trait;
use reqwest::header;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ensure_success, ChatPrompt, ChatProvider, MAX_TOKENS, TEMPERATURE};
use crate::config::ApiKey;
use crate::error::{Error, Result};

const PROVIDER: &str = "Groq";

/// Chat completion request (OpenAI-compatible).
#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat completion response, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct GroqClient {
    http: Client,
    base_url: String,
    api_key: ApiKey,
    model: String,
}

impl GroqClient {
    pub fn new(http: Client, base_url: &str, api_key: ApiKey, model: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, prompt: &ChatPrompt) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.message,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        tracing::debug!(model = %self.model, "Sending chat completion to Groq");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        let response = ensure_success(PROVIDER, response).await?;
        let parsed: ChatCompletionResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::MalformedResponse {
                provider: PROVIDER,
                detail: "no message content in first choice".to_string(),
            })
    }
}
