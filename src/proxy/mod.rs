//! HTTP server module.
//!
//! This module provides the JSON API used by the web client and forwards
//! requests to the routers.

mod handlers;
mod server;
pub mod types;

pub use handlers::UNKNOWN_MODEL_REPLY;
pub use server::{create_router, run_server, AppState, RequestId, REQUEST_ID_HEADER};
pub use types::{ChatRequest, ChatResponse, ImageResponse, PromptRequest, VideoResponse};
