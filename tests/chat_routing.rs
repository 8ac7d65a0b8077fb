//! Integration tests for POST /chat against mock Groq and Gemini servers.
//!
//! Verifies that:
//! - "groq" requests go to Groq only, with the fixed sampling parameters
//! - "gemini" requests go to Gemini and fall back to Groq on failure
//! - A missing Gemini key routes "gemini" requests straight to Groq
//! - Every outcome, including total failure, is HTTP 200 with text
//! - Unknown, differently cased or null models get a fixed reply
//! - The birthday clause reaches the provider on February 3rd

use std::sync::Arc;

use axum::body::Body;
use chrono::NaiveDate;
use http::Request;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use giftai::config::{ApiKey, Config, LoggingConfig, ProvidersConfig, ServerConfig};
use giftai::providers::{ChatProvider, GroqClient};
use giftai::proxy::{create_router, AppState};
use giftai::router::{ChatRouter, ImageRouter, PollinationsUrl};

const GROQ_PATH: &str = "/openai/v1/chat/completions";
const GEMINI_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

/// Build a config pointing both chat providers at `server`.
fn test_config(server: &MockServer, gemini_key: Option<&str>, groq_key: Option<&str>) -> Config {
    Config {
        server: ServerConfig {
            listen: "127.0.0.1:0".to_string(),
            static_dir: ".".to_string(),
        },
        providers: ProvidersConfig {
            gemini_api_key: gemini_key.map(ApiKey::from),
            groq_api_key: groq_key.map(ApiKey::from),
            groq_url: format!("{}/openai/v1", server.uri()),
            gemini_url: format!("{}/v1beta", server.uri()),
            ..Default::default()
        },
        logging: LoggingConfig::default(),
    }
}

fn app(config: Config) -> axum::Router {
    create_router(AppState::new(config, reqwest::Client::new()))
}

fn groq_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    }))
}

fn gemini_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    }))
}

async fn post_chat(app: axum::Router, body: serde_json::Value) -> (http::StatusCode, serde_json::Value) {
    let request = Request::post("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
        .await
        .expect("read body");
    (status, serde_json::from_slice(&bytes).unwrap_or_default())
}

#[tokio::test]
async fn test_groq_request_with_only_groq_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GROQ_PATH))
        .and(header("authorization", "Bearer gsk-test"))
        .respond_with(groq_reply("Hi there!"))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = post_chat(
        app(test_config(&server, None, Some("gsk-test"))),
        serde_json::json!({"message": "Hello", "model": "groq"}),
    )
    .await;

    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(json, serde_json::json!({"response": "Hi there!"}));

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["model"], "llama-3.3-70b-versatile");
    assert_eq!(sent["max_tokens"], 2048);
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(sent["messages"][1]["content"], "Hello");
}

#[tokio::test]
async fn test_missing_model_defaults_to_groq() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(gemini_reply("from gemini"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GROQ_PATH))
        .respond_with(groq_reply("from groq"))
        .expect(1)
        .mount(&server)
        .await;

    let (_, json) = post_chat(
        app(test_config(&server, Some("gem-key"), Some("gsk-test"))),
        serde_json::json!({"message": "Hello"}),
    )
    .await;

    assert_eq!(json["response"], "from groq");
}

#[tokio::test]
async fn test_gemini_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(header("x-goog-api-key", "gem-key"))
        .respond_with(gemini_reply("Namaste!"))
        .expect(1)
        .mount(&server)
        .await;

    let (_, json) = post_chat(
        app(test_config(&server, Some("gem-key"), Some("gsk-test"))),
        serde_json::json!({"message": "Hello", "model": "gemini"}),
    )
    .await;

    assert_eq!(json["response"], "Namaste!");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let text = sent["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(text.ends_with("\n\nUser Message: Hello"));
    assert!(text.contains("Dimple's AI"));
}

#[tokio::test]
async fn test_gemini_quota_error_falls_back_to_groq() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("Resource has been exhausted"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GROQ_PATH))
        .respond_with(groq_reply("Backup answer"))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = post_chat(
        app(test_config(&server, Some("gem-key"), Some("gsk-test"))),
        serde_json::json!({"message": "Hello", "model": "gemini"}),
    )
    .await;

    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(
        json["response"],
        "Backup answer\n\n*(Answered by Groq ⚡ due to Gemini traffic)*"
    );
}

#[tokio::test]
async fn test_gemini_without_key_uses_groq_directly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GROQ_PATH))
        .respond_with(groq_reply("Groq here"))
        .expect(1)
        .mount(&server)
        .await;

    let (_, json) = post_chat(
        app(test_config(&server, None, Some("gsk-test"))),
        serde_json::json!({"message": "Hello", "model": "gemini"}),
    )
    .await;

    // Not a fallback: no annotation
    assert_eq!(json["response"], "Groq here");
}

#[tokio::test]
async fn test_gemini_failure_without_groq() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .mount(&server)
        .await;

    let (status, json) = post_chat(
        app(test_config(&server, Some("gem-key"), None)),
        serde_json::json!({"message": "Hello", "model": "gemini"}),
    )
    .await;

    assert_eq!(status, http::StatusCode::OK);
    let text = json["response"].as_str().unwrap();
    assert!(text.starts_with(
        "Gemini is currently overloaded (Quota Exceeded) and Groq is unavailable. Error: "
    ));
    assert!(text.contains("429"));
}

#[tokio::test]
async fn test_both_providers_failing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GROQ_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("groq is down"))
        .mount(&server)
        .await;

    let (status, json) = post_chat(
        app(test_config(&server, Some("gem-key"), Some("gsk-test"))),
        serde_json::json!({"message": "Hello", "model": "gemini"}),
    )
    .await;

    assert_eq!(status, http::StatusCode::OK);
    let text = json["response"].as_str().unwrap();
    assert!(text.starts_with("I hit a technical snag: "));
    assert!(text.contains("groq is down"));
}

#[tokio::test]
async fn test_no_keys_configured() {
    let server = MockServer::start().await;
    let config = test_config(&server, None, None);

    let (_, groq) = post_chat(
        app(config.clone()),
        serde_json::json!({"message": "Hello", "model": "groq"}),
    )
    .await;
    assert_eq!(groq["response"], "Groq API Key is missing. Please add it to .env!");

    let (_, gemini) = post_chat(
        app(config),
        serde_json::json!({"message": "Hello", "model": "gemini"}),
    )
    .await;
    assert_eq!(gemini["response"], "No API keys found for Gemini or Groq.");
}

#[tokio::test]
async fn test_unknown_model() {
    let server = MockServer::start().await;
    let (status, json) = post_chat(
        app(test_config(&server, Some("gem-key"), Some("gsk-test"))),
        serde_json::json!({"message": "Hello", "model": "gpt-4"}),
    )
    .await;

    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(
        json["response"],
        "I'm having trouble thinking correctly right now."
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_null_model_is_unknown_not_bad_request() {
    let server = MockServer::start().await;
    let (status, json) = post_chat(
        app(test_config(&server, Some("gem-key"), Some("gsk-test"))),
        serde_json::json!({"message": "hi", "model": null}),
    )
    .await;

    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(
        json["response"],
        "I'm having trouble thinking correctly right now."
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_model_name_matched_exactly() {
    let server = MockServer::start().await;
    let config = test_config(&server, Some("gem-key"), Some("gsk-test"));

    for model in [" groq ", "Groq", "GEMINI"] {
        let (status, json) = post_chat(
            app(config.clone()),
            serde_json::json!({"message": "Hello", "model": model}),
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(
            json["response"],
            "I'm having trouble thinking correctly right now.",
            "model {:?} should not route",
            model
        );
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_groq_payload_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GROQ_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let (_, json) = post_chat(
        app(test_config(&server, None, Some("gsk-test"))),
        serde_json::json!({"message": "Hello", "model": "groq"}),
    )
    .await;

    let text = json["response"].as_str().unwrap();
    assert!(text.starts_with("I hit a technical snag: "));
    assert!(text.contains("unexpected response"));
}

/// Build an app whose chat router sees `date` as today.
fn app_on(server: &MockServer, date: NaiveDate) -> axum::Router {
    let config = test_config(server, None, Some("gsk-test"));
    let groq = GroqClient::new(
        reqwest::Client::new(),
        &config.providers.groq_url,
        ApiKey::from("gsk-test"),
        &config.providers.groq_model,
    );
    let chat = ChatRouter::new(None, Some(Arc::new(groq) as Arc<dyn ChatProvider>))
        .with_clock(move || date);

    let state = AppState {
        chat: Arc::new(chat),
        images: Arc::new(ImageRouter::new(
            None,
            PollinationsUrl::new(&config.providers.pollinations_url),
        )),
        config: Arc::new(config),
    };
    create_router(state)
}

async fn system_prompt_sent_on(date: NaiveDate) -> String {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GROQ_PATH))
        .respond_with(groq_reply("ok"))
        .mount(&server)
        .await;

    post_chat(
        app_on(&server, date),
        serde_json::json!({"message": "Hi", "model": "groq"}),
    )
    .await;

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    sent["messages"][0]["content"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_birthday_clause_sent_on_feb_third() {
    let system = system_prompt_sent_on(NaiveDate::from_ymd_opt(2027, 2, 3).unwrap()).await;
    assert!(system.contains("IT IS DIMPLE'S BIRTHDAY (Feb 3rd)!"));
}

#[tokio::test]
async fn test_no_birthday_clause_on_other_days() {
    let system = system_prompt_sent_on(NaiveDate::from_ymd_opt(2027, 3, 2).unwrap()).await;
    assert!(!system.contains("IT IS DIMPLE'S BIRTHDAY"));
    assert!(system.contains("Dimple's AI"));
}
