//! HTTP request handlers.
//!
//! Router outcomes, including provider failures, are always returned as
//! HTTP 200 with the explanation in the `response` text. Only bodies that are
//! not JSON at all are rejected with 400.

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    response::IntoResponse,
    Json,
};

use super::server::{AppState, RequestId};
use super::types::{ChatRequest, ChatResponse, ImageResponse, PromptRequest, VideoResponse};
use crate::error::Error;
use crate::router::ChatSlot;
use crate::video;

/// Reply for a `model` value that names neither provider.
pub const UNKNOWN_MODEL_REPLY: &str = "I'm having trouble thinking correctly right now.";

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| Error::BadRequest(rejection.body_text()))
}

/// Handle POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, Error> {
    let request = body(payload)?;

    tracing::info!(
        request_id = %request_id.0,
        model = ?request.model,
        "Received chat request"
    );

    let response = match request.model.as_deref().and_then(ChatSlot::from_model) {
        Some(preference) => {
            let result = state.chat.route(&request.message, preference).await;
            tracing::info!(
                request_id = %request_id.0,
                answered_by = ?result.answered_by,
                fallback = result.fallback_occurred,
                "Chat request complete"
            );
            result.text
        }
        None => {
            tracing::warn!(model = ?request.model, "Unknown chat model requested");
            UNKNOWN_MODEL_REPLY.to_string()
        }
    };

    Ok(Json(ChatResponse { response }))
}

/// Handle POST /generate_image
pub async fn generate_image(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<ImageResponse>, Error> {
    let request = body(payload)?;

    let result = state.images.route(&request.prompt).await;
    tracing::info!(
        request_id = %request_id.0,
        source = ?result.source,
        "Image request complete"
    );

    Ok(Json(ImageResponse {
        response: result.message(&request.prompt),
        image_url: result.image_url,
    }))
}

/// Handle POST /generate_video (placeholder, no provider call)
pub async fn generate_video(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<VideoResponse>, Error> {
    let request = body(payload)?;
    let stub = video::placeholder(&state.config.providers, &request.prompt);

    Ok(Json(VideoResponse {
        video_url: stub.video_url,
        response: stub.response,
    }))
}

/// Handle GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "giftai"
    }))
}

/// Handle GET /providers - which provider families are usable
pub async fn list_providers(State(state): State<AppState>) -> impl IntoResponse {
    let providers = &state.config.providers;
    Json(serde_json::json!({
        "chat": {
            "gemini": state.chat.has_primary(),
            "groq": state.chat.has_secondary(),
            "groq_model": providers.groq_model,
            "gemini_model": providers.gemini_model,
        },
        "image": {
            "freepik": state.images.has_primary(),
            "pollinations": true,
        },
        "video": {
            "provider": video::provider_label(providers),
            "stub": true,
        }
    }))
}
