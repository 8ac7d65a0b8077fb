//! HTTP server setup and configuration.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::handlers;
use crate::config::{Config, ProvidersConfig};
use crate::providers::{ChatProvider, FreepikClient, GeminiClient, GroqClient, ImageProvider};
use crate::router::{ChatRouter, ImageRouter, PollinationsUrl};

/// Response header carrying the per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation ID assigned to every incoming request.
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatRouter>,
    pub images: Arc<ImageRouter>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build provider clients for every configured credential.
    pub fn new(config: Config, http_client: Client) -> Self {
        let chat = build_chat_router(&config.providers, &http_client);
        let images = build_image_router(&config.providers, &http_client);

        Self {
            chat: Arc::new(chat),
            images: Arc::new(images),
            config: Arc::new(config),
        }
    }
}

fn build_chat_router(providers: &ProvidersConfig, http: &Client) -> ChatRouter {
    let gemini = providers.gemini_api_key.clone().map(|key| {
        Arc::new(GeminiClient::new(
            http.clone(),
            &providers.gemini_url,
            key,
            &providers.gemini_model,
        )) as Arc<dyn ChatProvider>
    });
    let groq = providers.groq_api_key.clone().map(|key| {
        Arc::new(GroqClient::new(
            http.clone(),
            &providers.groq_url,
            key,
            &providers.groq_model,
        )) as Arc<dyn ChatProvider>
    });

    ChatRouter::new(gemini, groq)
}

fn build_image_router(providers: &ProvidersConfig, http: &Client) -> ImageRouter {
    let freepik = providers.freepik_api_key.clone().map(|key| {
        Arc::new(FreepikClient::new(
            http.clone(),
            &providers.freepik_url,
            key,
            Duration::from_secs(providers.image_timeout_secs),
        )) as Arc<dyn ImageProvider>
    });

    ImageRouter::new(freepik, PollinationsUrl::new(&providers.pollinations_url))
}

/// Tag each request with a fresh `RequestId` and echo it back as a header.
async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let id = RequestId(Uuid::new_v4());
    request.extensions_mut().insert(id);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id.0.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

/// Answer 404 for any path with a dot-prefixed segment (`/.env`, `/.git/config`).
async fn reject_hidden_paths(request: Request, next: Next) -> Response {
    let hidden = match urlencoding::decode(request.uri().path()) {
        Ok(path) => path.split('/').any(|segment| segment.starts_with('.')),
        Err(_) => true,
    };
    if hidden {
        tracing::debug!(path = %request.uri().path(), "Refusing hidden static path");
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}

/// Create the axum router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    let static_dir = Router::new()
        .fallback_service(ServeDir::new(&state.config.server.static_dir))
        .layer(middleware::from_fn(reject_hidden_paths));

    Router::new()
        // Web client API
        .route("/chat", post(handlers::chat))
        .route("/generate_image", post(handlers::generate_image))
        .route("/generate_video", post(handlers::generate_video))
        // Introspection
        .route("/health", get(handlers::health))
        .route("/providers", get(handlers::list_providers))
        // Web client assets, "/" resolves to index.html
        .fallback_service(static_dir)
        .with_state(state)
        .layer(middleware::from_fn(assign_request_id))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let listen_addr = config.server.listen.clone();

    // Chat calls rely on these defaults; the image call sets its own timeout
    let http_client = Client::builder()
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let state = AppState::new(config, http_client);
    tracing::info!(
        gemini = state.chat.has_primary(),
        groq = state.chat.has_secondary(),
        freepik = state.images.has_primary(),
        "Providers configured"
    );
    if !state.chat.is_configured() {
        tracing::warn!("No chat provider keys configured, chat will answer with setup hints");
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "Starting giftai server");

    axum::serve(listener, app).await?;

    Ok(())
}
