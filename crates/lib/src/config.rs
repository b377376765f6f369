//! Configuration types and loading.
//!
//! Secrets come from the process environment with a `.env` fallback file in the
//! working directory (the file only fills gaps; set environment variables win).
//! Absent secrets resolve to empty strings and are reported at startup; the
//! upstream APIs reject them like any other bad credential.

pub const DEEPSEEK_API_KEY_VAR: &str = "DEEPSEEK_API_KEY";
pub const WAMUNDO_API_KEY_VAR: &str = "WAMUNDO_API_KEY";
pub const WAMUNDO_PHONE_ID_VAR: &str = "WAMUNDO_PHONE_ID";
pub const PORT_VAR: &str = "PORT";

/// Credentials for the two upstream APIs plus the WhatsApp sender id.
/// Loaded once at startup and cloned into the clients; never mutated.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// Bearer token for the DeepSeek chat-completions API.
    pub deepseek_api_key: String,

    /// Bearer token for the WaMundo send-message API.
    pub wamundo_api_key: String,

    /// WaMundo phone id the bot sends from.
    pub wamundo_phone_id: String,
}

impl Secrets {
    /// Variable names whose values resolved to the empty string (for startup warnings).
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.deepseek_api_key.is_empty() {
            missing.push(DEEPSEEK_API_KEY_VAR);
        }
        if self.wamundo_api_key.is_empty() {
            missing.push(WAMUNDO_API_KEY_VAR);
        }
        if self.wamundo_phone_id.is_empty() {
            missing.push(WAMUNDO_PHONE_ID_VAR);
        }
        missing
    }
}

/// Load secrets from the environment, filling gaps from a `.env` file when one
/// exists. Never fails: absent values become empty strings.
pub fn load_secrets() -> Secrets {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("loaded .env from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::debug!("skipping .env: {}", e),
    }
    Secrets {
        deepseek_api_key: env_or_empty(DEEPSEEK_API_KEY_VAR),
        wamundo_api_key: env_or_empty(WAMUNDO_API_KEY_VAR),
        wamundo_phone_id: env_or_empty(WAMUNDO_PHONE_ID_VAR),
    }
}

fn env_or_empty(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// Gateway bind and port settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address (default "0.0.0.0").
    pub bind: String,

    /// HTTP port (default 5000, overridable via PORT).
    pub port: u16,
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_gateway_bind(),
            port: default_gateway_port(),
        }
    }
}

/// Resolve the gateway port: PORT env when it parses as a port, else 5000.
pub fn resolve_port() -> u16 {
    parse_port(std::env::var(PORT_VAR).ok())
}

/// Parse an optional PORT value; anything absent or unparseable falls back to the default.
pub fn parse_port(value: Option<String>) -> u16 {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(default_gateway_port)
}
