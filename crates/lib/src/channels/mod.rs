//! Messaging channels.
//!
//! Outbound trait so the gateway can send replies without knowing the
//! provider, plus the WaMundo WhatsApp implementation and its inbound
//! webhook wire types.

mod wamundo;

use async_trait::async_trait;

pub use wamundo::{WamundoChannel, WamundoError, WamundoEvent, WamundoEventMessage};

/// Outbound message delivery: `true` means the provider accepted the request,
/// `false` means it did not. Infallible by contract — failures are logged by
/// the implementation, not raised.
#[async_trait]
pub trait OutboundChannel: Send + Sync {
    async fn send_message(&self, to: &str, body: &str) -> bool;
}
