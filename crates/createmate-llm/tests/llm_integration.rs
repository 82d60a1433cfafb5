#![allow(clippy::unwrap_used, clippy::expect_used)]

use createmate_core::CreateMateError;
use createmate_llm::{LlmClient, LlmProvider, ModelConfig, RetryPolicy};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_config(server: &MockServer) -> ModelConfig {
    let mut config = ModelConfig::gemini("test-key");
    config.api_base_url = Some(server.uri());
    config
}

fn gemini_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn gemini_generate_sends_key_and_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{ "parts": [{ "text": "Suggest days" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("[\"Monday\"]")))
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::new(gemini_config(&server));
    let text = client.generate("Suggest days").await.unwrap();
    assert_eq!(text, "[\"Monday\"]");
}

#[tokio::test]
async fn gemini_error_status_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({ "error": { "message": "API key invalid" } })),
        )
        .mount(&server)
        .await;

    let client = LlmClient::new(gemini_config(&server));
    let err = client.generate("hi").await.unwrap_err();
    match err {
        CreateMateError::Http(msg) => {
            assert!(msg.contains("403"), "{msg}");
            assert!(msg.contains("API key invalid"), "{msg}");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn gemini_retries_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({})))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("recovered")))
        .with_priority(2)
        .mount(&server)
        .await;

    let mut config = gemini_config(&server);
    config.retry_policy = Some(RetryPolicy {
        max_retries: 3,
        backoff_base_ms: 1,
        backoff_max_ms: 5,
    });
    let client = LlmClient::new(config);
    assert_eq!(client.generate("hi").await.unwrap(), "recovered");
}

#[tokio::test]
async fn falls_back_to_openai_compatible_model() {
    let primary = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({})))
        .mount(&primary)
        .await;

    let fallback = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer groq-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "from groq" } }]
        })))
        .expect(1)
        .mount(&fallback)
        .await;

    let mut config = gemini_config(&primary);
    config.fallback_models.push(ModelConfig {
        provider: LlmProvider::Groq,
        model_id: "llama-3.3-70b-versatile".into(),
        api_key: "groq-key".into(),
        api_base_url: Some(fallback.uri()),
        temperature: 0.7,
        max_tokens: 1024,
        fallback_models: Vec::new(),
        retry_policy: None,
    });

    let client = LlmClient::new(config);
    assert_eq!(client.generate("hi").await.unwrap(), "from groq");
}

#[tokio::test]
async fn openrouter_sends_attribution_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("X-Title", "CreateMate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "ok" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = ModelConfig::gemini("or-key");
    config.provider = LlmProvider::OpenRouter;
    config.model_id = "google/gemini-2.0-flash-001".into();
    config.api_base_url = Some(server.uri());

    assert_eq!(LlmClient::new(config).generate("hi").await.unwrap(), "ok");
}
