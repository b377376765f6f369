//! WaMundo WhatsApp channel: send-message API plus inbound webhook payloads.

use crate::channels::OutboundChannel;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.wamundo.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the WaMundo send-message API.
#[derive(Clone)]
pub struct WamundoChannel {
    api_key: String,
    phone_id: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum WamundoError {
    #[error("wamundo request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("wamundo api error: {0}")]
    Api(String),
}

impl WamundoChannel {
    pub fn new(api_key: String, phone_id: String) -> Self {
        Self::with_base_url(api_key, phone_id, DEFAULT_BASE_URL.to_string())
    }

    /// Channel against a custom endpoint (tests, proxies).
    pub fn with_base_url(api_key: String, phone_id: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            api_key,
            phone_id,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// POST /send-message — one delivery attempt. The response body is not
    /// inspected; a 2xx status counts as delivered. No retry.
    async fn post_message(&self, to: &str, body: &str) -> Result<(), WamundoError> {
        let url = format!("{}/send-message", self.base_url);
        let payload = serde_json::json!({
            "phone_id": self.phone_id,
            "to": to,
            "message": body,
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(WamundoError::Api(format!("{} {}", status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl OutboundChannel for WamundoChannel {
    /// Never fails: a failed delivery is logged and reported as `false`.
    async fn send_message(&self, to: &str, body: &str) -> bool {
        match self.post_message(to, body).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("wamundo send to {} failed: {}", to, e);
                false
            }
        }
    }
}

/// Inbound webhook payload from WaMundo. Every field is optional so absent
/// and `null` decode the same way; validity is checked by `sender_and_text`.
#[derive(Debug, Default, Deserialize)]
pub struct WamundoEvent {
    #[serde(default)]
    pub from: Option<String>,

    #[serde(default)]
    pub message: Option<WamundoEventMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WamundoEventMessage {
    #[serde(default)]
    pub body: Option<String>,
}

impl WamundoEvent {
    /// Sender id and message text when both are present; `None` otherwise.
    /// Empty strings are valid.
    pub fn sender_and_text(&self) -> Option<(&str, &str)> {
        let from = self.from.as_deref()?;
        let body = self.message.as_ref()?.body.as_deref()?;
        Some((from, body))
    }
}
