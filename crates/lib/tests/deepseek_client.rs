//! Integration tests for the DeepSeek client against a local mock upstream.
//! Every failure path must resolve to one of the two fixed fallback strings;
//! the client never returns an error to its caller.

use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use lib::llm::{CompletionBackend, DeepSeekClient};
use std::sync::{Arc, Mutex};

const FALLBACK_REQUEST_FAILED: &str =
    "Lo siento, hubo un error al procesar tu mensaje. Por favor intenta de nuevo.";
const FALLBACK_NO_COMPLETION: &str = "Lo siento, no pude procesar tu mensaje en este momento.";

/// Start a mock upstream and return its base URL.
async fn start_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock upstream");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}

/// Request captured by the mock: auth header plus decoded JSON body.
#[derive(Clone, Default)]
struct Captured {
    auth: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<serde_json::Value>>>,
}

async fn completions_ok(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    *captured.auth.lock().expect("lock") = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    *captured.body.lock().expect("lock") = Some(body);
    Json(serde_json::json!({
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "¡Hola!"}}
        ]
    }))
}

#[tokio::test]
async fn returns_completion_text_and_sends_fixed_parameters() {
    let captured = Captured::default();
    let base = start_mock(
        Router::new()
            .route("/chat/completions", post(completions_ok))
            .with_state(captured.clone()),
    )
    .await;

    let client = DeepSeekClient::with_base_url("sk-test".to_string(), base);
    assert_eq!(client.complete("hola").await, "¡Hola!");

    let auth = captured.auth.lock().expect("lock").clone();
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));

    let body = captured.body.lock().expect("lock").clone().expect("captured body");
    assert_eq!(body["model"], "deepseek-chat");
    assert_eq!(body["temperature"], 0.7);
    assert_eq!(body["max_tokens"], 500);
    let messages = body["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert!(messages[0]["content"]
        .as_str()
        .expect("system content")
        .starts_with("Eres Herasi AI Agent"));
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "hola");
}

#[tokio::test]
async fn falls_back_when_response_has_no_completion_text() {
    let base = start_mock(Router::new().route(
        "/chat/completions",
        post(|| async { Json(serde_json::json!({"choices": []})) }),
    ))
    .await;

    let client = DeepSeekClient::with_base_url("sk-test".to_string(), base);
    assert_eq!(client.complete("hola").await, FALLBACK_NO_COMPLETION);
}

#[tokio::test]
async fn treats_undecodable_200_as_missing_completion() {
    let base = start_mock(Router::new().route(
        "/chat/completions",
        post(|| async { "definitely not json" }),
    ))
    .await;

    let client = DeepSeekClient::with_base_url("sk-test".to_string(), base);
    assert_eq!(client.complete("hola").await, FALLBACK_NO_COMPLETION);
}

#[tokio::test]
async fn falls_back_on_api_error_status() {
    let base = start_mock(Router::new().route(
        "/chat/completions",
        post(|| async {
            (
                axum::http::StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "invalid api key"})),
            )
                .into_response()
        }),
    ))
    .await;

    let client = DeepSeekClient::with_base_url("".to_string(), base);
    assert_eq!(client.complete("hola").await, FALLBACK_REQUEST_FAILED);
}

#[tokio::test]
async fn falls_back_when_upstream_is_unreachable() {
    // Grab a free port and release it so the connect is refused.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local_addr").port()
    };

    let client =
        DeepSeekClient::with_base_url("sk-test".to_string(), format!("http://127.0.0.1:{}", port));
    assert_eq!(client.complete("hola").await, FALLBACK_REQUEST_FAILED);
}
