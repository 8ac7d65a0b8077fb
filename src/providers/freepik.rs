//! Freepik text-to-image client.
//!
//! The response schema is treated as best-effort: the first element of `data`
//! may carry an inline `base64` payload, a `url`, or both. `base64` wins.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{ensure_success, GeneratedImage, ImageProvider};
use crate::config::ApiKey;
use crate::error::{Error, Result};

const PROVIDER: &str = "Freepik";
const API_KEY_HEADER: &str = "x-freepik-api-key";

#[derive(Serialize)]
struct TextToImageRequest<'a> {
    prompt: &'a str,
    num_images: u32,
    image_size: &'static str,
}

/// Pick the image out of a Freepik response body.
fn extract_image(body: &serde_json::Value) -> Result<GeneratedImage> {
    let first = body
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|d| d.first())
        .ok_or_else(|| Error::MalformedResponse {
            provider: PROVIDER,
            detail: "missing data array".to_string(),
        })?;

    if let Some(payload) = first.get("base64").and_then(|v| v.as_str()) {
        return Ok(GeneratedImage::Inline(payload.to_string()));
    }
    if let Some(url) = first.get("url").and_then(|v| v.as_str()) {
        return Ok(GeneratedImage::Url(url.to_string()));
    }

    Err(Error::MalformedResponse {
        provider: PROVIDER,
        detail: "first result has neither base64 nor url".to_string(),
    })
}

pub struct FreepikClient {
    http: Client,
    base_url: String,
    api_key: ApiKey,
    timeout: Duration,
}

impl FreepikClient {
    pub fn new(http: Client, base_url: &str, api_key: ApiKey, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl ImageProvider for FreepikClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        let body = TextToImageRequest {
            prompt,
            num_images: 1,
            image_size: "square",
        };

        let response = self
            .http
            .post(format!("{}/v1/ai/text-to-image", self.base_url))
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let response = ensure_success(PROVIDER, response).await?;
        let parsed: serde_json::Value = response.json().await?;
        extract_image(&parsed)
    }
}
