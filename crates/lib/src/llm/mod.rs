//! LLM completion backend abstraction and the DeepSeek client.

mod deepseek;

use async_trait::async_trait;

pub use deepseek::{ChatCompletionResponse, DeepSeekClient, DeepSeekError};

/// One-shot completion backend: a single user message in, reply text out.
/// Infallible by contract — implementations degrade failures to fallback text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, user_message: &str) -> String;
}
