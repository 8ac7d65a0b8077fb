//! Error types for giftai.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Result type alias for giftai operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for giftai.
///
/// Provider failures never reach the HTTP client as errors: the routers turn
/// them into response text. Only `BadRequest` is rendered directly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{provider} returned {status}: {body}")]
    Provider {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an unexpected response: {detail}")]
    MalformedResponse {
        provider: &'static str,
        detail: String,
    },

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Provider-side failures keep the 200 envelope; the text carries the outcome.
            _ => StatusCode::OK,
        };

        let body = serde_json::json!({ "response": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
