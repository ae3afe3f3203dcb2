//! API integration tests.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{ header, Method, Request, StatusCode },
    Router,
};
use serde_json::{ json, Value };
use std::sync::Arc;
use tower::ServiceExt;

use chat_agent::agent::ChatAgent;
use chat_agent::history::InMemoryHistory;
use chat_agent::llm::chat::{ ChatClient, ChatError, CompletionResponse };
use chat_agent::models::chat::ChatMessage;
use chat_agent::server::api::router;

/// Stands in for the Groq API so no network is touched.
struct StubChatClient {
    reply: Option<String>,
}

#[async_trait]
impl ChatClient for StubChatClient {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<CompletionResponse, ChatError> {
        match &self.reply {
            Some(reply) => Ok(CompletionResponse { response: reply.clone() }),
            None => Err(ChatError::Provider("no completion choices returned".to_string())),
        }
    }

    fn get_model(&self) -> String {
        "llama-3.1-8b-instant".to_string()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

fn test_app(reply: Option<&str>) -> Router {
    let agent = ChatAgent::with_parts(
        Arc::new(StubChatClient {
            reply: reply.map(str::to_string),
        }),
        Arc::new(InMemoryHistory::new())
    );
    router(Arc::new(agent))
}

async fn send_chat(app: &Router, body: Body) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/chat")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap()
        ).await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn send_get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).method(Method::GET).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(Some("hello"));

    let (status, json) = send_get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_chat_success_records_history() {
    let app = test_app(Some("hello"));

    let body = Body::from(serde_json::to_string(&json!({ "message": "hi" })).unwrap());
    let (status, json) = send_chat(&app, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["response"], "hello");
    assert_eq!(json["status"], "success");
    assert_eq!(json["model"], "llama-3.1-8b-instant");
    assert_eq!(json["conversation_id"], 1);
    assert_eq!(json["history_count"], 1);

    let (status, json) = send_get(&app, "/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["total_exchanges"], 1);
    assert_eq!(json["history"][0]["user"], "hi");
    assert_eq!(json["history"][0]["assistant"], "hello");
    assert!(json["history"][0]["timestamp"].is_string());
}

#[tokio::test]
async fn test_chat_counts_grow_per_turn() {
    let app = test_app(Some("ok"));

    for expected in 1..=3 {
        let body = Body::from(
            serde_json::to_string(&json!({ "message": format!("turn {}", expected) })).unwrap()
        );
        let (status, json) = send_chat(&app, body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["conversation_id"], expected);
        assert_eq!(json["history_count"], expected);
    }
}

#[tokio::test]
async fn test_chat_without_message_is_rejected() {
    let app = test_app(Some("hello"));

    let body = Body::from(serde_json::to_string(&json!({})).unwrap());
    let (status, json) = send_chat(&app, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No message provided");
    assert_eq!(json["status"], "failed");

    // The rejected request must not touch history.
    let (_, json) = send_get(&app, "/history").await;
    assert_eq!(json["total_exchanges"], 0);
}

#[tokio::test]
async fn test_chat_with_non_json_body_is_rejected() {
    let app = test_app(Some("hello"));

    let (status, json) = send_chat(&app, Body::from("not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No message provided");
    assert_eq!(json["status"], "failed");
}

#[tokio::test]
async fn test_provider_failure_returns_500_and_keeps_history_clean() {
    let app = test_app(None);

    let body = Body::from(serde_json::to_string(&json!({ "message": "hi" })).unwrap());
    let (status, json) = send_chat(&app, body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["status"], "failed");
    assert!(json["error"].as_str().unwrap().contains("no completion choices"));

    let (_, json) = send_get(&app, "/history").await;
    assert_eq!(json["total_exchanges"], 0);
}

#[tokio::test]
async fn test_clear_history_resets_summary() {
    let app = test_app(Some("pong"));

    for message in ["one", "two", "three"] {
        let body = Body::from(serde_json::to_string(&json!({ "message": message })).unwrap());
        let (status, _) = send_chat(&app, body).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = send_get(&app, "/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_exchanges"], 3);
    assert!(json["summary"].as_str().unwrap().starts_with("Previous conversations:\n"));
    assert!(json["summary"].as_str().unwrap().contains("1. User: one\n   Bot: pong"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/history")
                .method(Method::DELETE)
                .body(Body::empty())
                .unwrap()
        ).await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "Conversation history cleared");

    let (_, json) = send_get(&app, "/summary").await;
    assert_eq!(json["total_exchanges"], 0);
    assert_eq!(json["summary"], "Previous conversations:\n");
}
