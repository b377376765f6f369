//! Gateway HTTP server: route table, handlers, and the serve loop.

use crate::channels::{OutboundChannel, WamundoChannel, WamundoEvent};
use crate::config::{GatewayConfig, Secrets};
use crate::llm::{CompletionBackend, DeepSeekClient};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{StatusCode, Uri},
    routing::{get, post},
    Json, Router, ServiceExt,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower::Layer;

const BOT_NAME: &str = "Herasi AI Agent";
const STATUS_MESSAGE: &str = "Bot de WhatsApp con IA funcionando correctamente";

/// Shared state for the gateway: the two upstream clients behind trait objects
/// so tests can stub them. Immutable after construction.
#[derive(Clone)]
pub struct GatewayState {
    pub completion: Arc<dyn CompletionBackend>,
    pub channel: Arc<dyn OutboundChannel>,
}

impl GatewayState {
    /// Production state: DeepSeek completion plus WaMundo delivery.
    pub fn from_secrets(secrets: &Secrets) -> Self {
        Self {
            completion: Arc::new(DeepSeekClient::new(secrets.deepseek_api_key.clone())),
            channel: Arc::new(WamundoChannel::new(
                secrets.wamundo_api_key.clone(),
                secrets.wamundo_phone_id.clone(),
            )),
        }
    }
}

/// Strip a trailing `.php` from the request path, preserving the query string.
/// Returns `None` when the URI needs no rewrite.
fn normalize_legacy_uri(uri: &Uri) -> Option<Uri> {
    let stripped = uri.path().strip_suffix(".php")?;
    let path_and_query = match uri.query() {
        Some(q) => format!("{}?{}", stripped, q),
        None => stripped.to_string(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}

/// Rewrite legacy `.php` spellings to the clean path. Runs before routing so
/// each endpoint is registered once.
fn strip_legacy_suffix(mut req: Request) -> Request {
    if let Some(uri) = normalize_legacy_uri(req.uri()) {
        log::debug!("normalized legacy path {} -> {}", req.uri().path(), uri.path());
        *req.uri_mut() = uri;
    }
    req
}

/// Route table over clean paths. A method mismatch on a known path falls
/// through to the same 404 payload as an unknown path, never a bare 405.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/bot", get(status).fallback(not_found))
        .route("/bot/", get(status).fallback(not_found))
        .route("/bot/index", get(status).fallback(not_found))
        .route("/bot/webhook", post(webhook).fallback(not_found))
        .route("/bot/test", post(test_completion).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
}

/// Run the gateway server; binds to config.bind:config.port and blocks until
/// shutdown (Ctrl+C or SIGTERM).
pub async fn run_gateway(config: GatewayConfig, state: GatewayState) -> Result<()> {
    let app = tower::util::MapRequestLayer::new(strip_legacy_suffix).layer(router(state));

    let bind_addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET /bot — fixed status payload, no side effects.
async fn status() -> Json<serde_json::Value> {
    Json(json!({
        "status": "online",
        "bot": BOT_NAME,
        "message": STATUS_MESSAGE,
    }))
}

/// POST /bot/webhook — WaMundo inbound message callback.
/// Valid events always get a success response: the reply send is
/// fire-and-forget and its outcome is only logged, matching the contract
/// WaMundo callers already rely on.
async fn webhook(
    State(state): State<GatewayState>,
    body: Bytes,
) -> (StatusCode, Json<serde_json::Value>) {
    log::info!("webhook recibido: {}", String::from_utf8_lossy(&body));

    let event: WamundoEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(_) => return invalid_format(),
    };
    let Some((from, text)) = event.sender_and_text() else {
        return invalid_format();
    };

    let reply = state.completion.complete(text).await;
    if !state.channel.send_message(from, &reply).await {
        log::warn!("reply to {} was not delivered", from);
    }

    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": "Mensaje procesado correctamente",
        })),
    )
}

fn invalid_format() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "status": "error",
            "message": "Formato de mensaje inválido",
        })),
    )
}

#[derive(Debug, Default, Deserialize)]
struct TestRequest {
    #[serde(default)]
    mensaje: Option<String>,
}

/// POST /bot/test — run a completion and return it directly, without sending
/// anything through the channel. Invalid JSON counts as a missing parameter.
async fn test_completion(
    State(state): State<GatewayState>,
    body: Bytes,
) -> (StatusCode, Json<serde_json::Value>) {
    let req: TestRequest = serde_json::from_slice(&body).unwrap_or_default();
    let Some(mensaje) = req.mensaje else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "error",
                "message": "Falta el parámetro 'mensaje'",
            })),
        );
    };

    let respuesta = state.completion.complete(&mensaje).await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "respuesta": respuesta,
        })),
    )
}

/// Any unmatched method/path pair.
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "error",
            "message": "Endpoint no encontrado",
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        s.parse().expect("uri")
    }

    #[test]
    fn normalize_strips_php_suffix() {
        let out = normalize_legacy_uri(&uri("/bot/webhook.php")).expect("rewrite");
        assert_eq!(out.path(), "/bot/webhook");

        let out = normalize_legacy_uri(&uri("/bot/index.php")).expect("rewrite");
        assert_eq!(out.path(), "/bot/index");
    }

    #[test]
    fn normalize_preserves_query() {
        let out = normalize_legacy_uri(&uri("/bot/test.php?debug=1")).expect("rewrite");
        assert_eq!(out.path(), "/bot/test");
        assert_eq!(out.query(), Some("debug=1"));
    }

    #[test]
    fn normalize_leaves_clean_paths_alone() {
        assert!(normalize_legacy_uri(&uri("/bot/webhook")).is_none());
        assert!(normalize_legacy_uri(&uri("/bot/")).is_none());
        assert!(normalize_legacy_uri(&uri("/other")).is_none());
    }
}
