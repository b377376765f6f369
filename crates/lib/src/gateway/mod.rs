//! Gateway: the webhook HTTP surface.
//!
//! Routes WaMundo callbacks to the completion backend and relays replies
//! through the outbound channel. One handler invocation per request, no
//! cross-request state.

mod server;

pub use server::{router, run_gateway, GatewayState};
