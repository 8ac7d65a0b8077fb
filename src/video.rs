//! Video generation stub.
//!
//! No provider is called. The configured credentials only pick the label shown
//! in the reply; the asset is always the same placeholder clip.

use crate::config::ProvidersConfig;

/// Placeholder clip returned for every request.
pub const PLACEHOLDER_VIDEO_URL: &str = "https://www.w3schools.com/html/mov_bbb.mp4";

/// Maximum prompt characters echoed back in the reply.
const SCENE_PREVIEW_CHARS: usize = 100;

/// Stub reply for a video request.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoStub {
    pub video_url: String,
    pub response: String,
}

/// Label of the video provider the reply claims to use.
pub fn provider_label(providers: &ProvidersConfig) -> &'static str {
    if providers.veo_api_key.is_some() {
        "Google Veo (High-Def)"
    } else if providers.kling_access_key.is_some() {
        "Kling AI"
    } else {
        "Simulation"
    }
}

/// Build the placeholder reply for `prompt`.
pub fn placeholder(providers: &ProvidersConfig, prompt: &str) -> VideoStub {
    let label = provider_label(providers);
    let scene: String = prompt.chars().take(SCENE_PREVIEW_CHARS).collect();

    tracing::debug!(provider = label, "Returning placeholder video");

    VideoStub {
        video_url: PLACEHOLDER_VIDEO_URL.to_string(),
        response: format!(
            "I've generated this video using **{}** based on your detailed request! 🎥\n\n*Scene:* {}...",
            label, scene
        ),
    }
}
