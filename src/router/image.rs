//! Image provider selection: one paid attempt, then a free URL fallback.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::chat::panic_message;
use super::fallback::{first_success, FallbackOutcome, Named};
use crate::error::Error;
use crate::providers::{GeneratedImage, ImageProvider};

const POLLINATIONS: &str = "pollinations.ai";

/// Where an image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Freepik
    Primary,
    /// pollinations.ai
    Secondary,
}

/// Result of routing one image prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResult {
    /// Data URI or remote URL
    pub image_url: String,
    pub source: ImageSource,
    /// Display name of the provider that produced the image
    pub provider: &'static str,
}

impl ImageResult {
    /// Caption returned next to the image.
    pub fn message(&self, prompt: &str) -> String {
        match self.source {
            ImageSource::Primary => format!(
                "Here is your AI-generated image (via {}) for: {}",
                self.provider, prompt
            ),
            ImageSource::Secondary => format!("I've created this image for you: {}", prompt),
        }
    }
}

/// Builds pollinations.ai prompt URLs. Never touches the network.
#[derive(Debug, Clone)]
pub struct PollinationsUrl {
    base_url: String,
}

impl PollinationsUrl {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn for_prompt(&self, prompt: &str) -> String {
        format!("{}/prompt/{}", self.base_url, urlencoding::encode(prompt))
    }
}

enum ImageCandidate {
    Remote(Arc<dyn ImageProvider>),
    Pollinations,
}

impl Named for ImageCandidate {
    fn provider_name(&self) -> &'static str {
        match self {
            ImageCandidate::Remote(provider) => provider.name(),
            ImageCandidate::Pollinations => POLLINATIONS,
        }
    }
}

/// Routes image prompts to Freepik, falling back to a pollinations.ai URL.
#[derive(Clone)]
pub struct ImageRouter {
    primary: Option<Arc<dyn ImageProvider>>,
    fallback: PollinationsUrl,
}

impl ImageRouter {
    pub fn new(primary: Option<Arc<dyn ImageProvider>>, fallback: PollinationsUrl) -> Self {
        Self { primary, fallback }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    fn fallback_result(&self, prompt: &str) -> ImageResult {
        ImageResult {
            image_url: self.fallback.for_prompt(prompt),
            source: ImageSource::Secondary,
            provider: POLLINATIONS,
        }
    }

    /// Route one prompt. Never fails: the fallback URL is always available.
    pub async fn route(&self, prompt: &str) -> ImageResult {
        match AssertUnwindSafe(self.route_inner(prompt)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                tracing::error!(error = %panic_message(panic.as_ref()), "Image routing panicked");
                self.fallback_result(prompt)
            }
        }
    }

    async fn route_inner(&self, prompt: &str) -> ImageResult {
        let plan: Vec<ImageCandidate> = self
            .primary
            .clone()
            .map(ImageCandidate::Remote)
            .into_iter()
            .chain(std::iter::once(ImageCandidate::Pollinations))
            .collect();

        let run = first_success(&plan, |candidate| {
            let remote = match candidate {
                ImageCandidate::Remote(provider) => Some(provider.clone()),
                ImageCandidate::Pollinations => None,
            };
            let prompt = prompt.to_string();
            let fallback_url = self.fallback.for_prompt(&prompt);
            async move {
                match remote {
                    Some(provider) => {
                        let image = provider.generate(&prompt).await?;
                        Ok::<_, Error>(remote_result(provider.name(), image))
                    }
                    None => Ok(ImageResult {
                        image_url: fallback_url,
                        source: ImageSource::Secondary,
                        provider: POLLINATIONS,
                    }),
                }
            }
        })
        .await;

        match run.outcome {
            FallbackOutcome::Served { value, .. } => {
                tracing::info!(provider = value.provider, "Image ready");
                value
            }
            // Unreachable while the plan ends with the URL fallback.
            FallbackOutcome::Exhausted { .. } | FallbackOutcome::NoCandidates => {
                self.fallback_result(prompt)
            }
        }
    }
}

fn remote_result(provider: &'static str, image: GeneratedImage) -> ImageResult {
    let image_url = match image {
        GeneratedImage::Inline(payload) => format!("data:image/png;base64,{}", payload),
        GeneratedImage::Url(url) => url,
    };
    ImageResult {
        image_url,
        source: ImageSource::Primary,
        provider,
    }
}
