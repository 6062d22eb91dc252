use flashgpt_server::services::llm_client::{
    ChatCompletion, ChatMessage, GroqClient, LlmError, SYSTEM_PROMPT,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> GroqClient {
    GroqClient::new(
        server.uri(),
        "gsk_test".to_string(),
        "llama-3.3-70b-versatile".to_string(),
    )
}

#[tokio::test]
async fn test_complete_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gsk_test"))
        .and(body_partial_json(json!({
            "model": "llama-3.3-70b-versatile",
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": "What is Rust?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "model": "llama-3.3-70b-versatile",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "A systems language." } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server)
        .complete(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user("What is Rust?"),
        ])
        .await
        .unwrap();

    assert_eq!(reply, "A systems language.");
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "ok" } }]
        })))
        .mount(&server)
        .await;

    let client = GroqClient::new(
        format!("{}/", server.uri()),
        "gsk_test".to_string(),
        "m".to_string(),
    );
    assert_eq!(client.model(), "m");
    assert_eq!(
        client.complete(vec![ChatMessage::user("hi")]).await.unwrap(),
        "ok"
    );
}

#[tokio::test]
async fn test_upstream_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let result = client(&server)
        .complete(vec![ChatMessage::user("hi")])
        .await;

    match result {
        Err(LlmError::ApiError { status, message }) => {
            assert_eq!(status, 429);
            assert_eq!(message, "rate limited");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_choices_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let result = client(&server)
        .complete(vec![ChatMessage::user("hi")])
        .await;

    assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
}
