//! DeepSeek chat-completions client (https://api.deepseek.com).
//!
//! One request per inbound message: fixed persona system prompt plus the user
//! text. The public `complete` never fails; transport and API errors resolve to
//! fixed Spanish fallback strings so the gateway always has something to reply.

use crate::llm::CompletionBackend;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
const MODEL: &str = "deepseek-chat";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "Eres Herasi AI Agent, un asistente virtual inteligente y amigable. Ayudas a los usuarios con sus consultas de manera clara, concisa y útil. Siempre respondes en el idioma del usuario.";

/// Returned when the request itself failed (timeout, connect error, non-2xx).
pub const FALLBACK_REQUEST_FAILED: &str =
    "Lo siento, hubo un error al procesar tu mensaje. Por favor intenta de nuevo.";

/// Returned when the API answered but carried no completion text.
pub const FALLBACK_NO_COMPLETION: &str =
    "Lo siento, no pude procesar tu mensaje en este momento.";

/// Client for the DeepSeek chat-completions API.
#[derive(Clone)]
pub struct DeepSeekClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum DeepSeekError {
    #[error("deepseek request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("deepseek api error: {0}")]
    Api(String),
}

impl DeepSeekClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Client against a custom endpoint (tests, proxies).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// POST /chat/completions — one non-streaming completion.
    /// A 2xx response whose body is not the expected JSON decodes to the
    /// default (empty) response, so "200 but garbage" means no completion
    /// text rather than a transport error.
    async fn chat(&self, user_message: &str) -> Result<ChatCompletionResponse, DeepSeekError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: MODEL,
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatRequestMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(DeepSeekError::Api(format!("{} {}", status, body)));
        }
        let text = res.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }
}

#[async_trait]
impl CompletionBackend for DeepSeekClient {
    /// Never fails: transport/API errors and empty responses each map to a
    /// fixed fallback string, logged with the reason.
    async fn complete(&self, user_message: &str) -> String {
        match self.chat(user_message).await {
            Ok(res) => match res.content() {
                Some(text) => text.to_string(),
                None => {
                    log::warn!("deepseek response carried no completion text");
                    FALLBACK_NO_COMPLETION.to_string()
                }
            },
            Err(e) => {
                log::warn!("deepseek completion failed: {}", e);
                FALLBACK_REQUEST_FAILED.to_string()
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// OpenAI-style completion response; only `choices[0].message.content` is read.
#[derive(Debug, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<AssistantMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice's assistant message, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices.first()?.message.as_ref()?.content.as_deref()
    }
}
