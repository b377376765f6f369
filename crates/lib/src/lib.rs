//! Herasi core library — configuration, DeepSeek completion client,
//! WaMundo messaging channel, and the webhook gateway used by the CLI.

pub mod channels;
pub mod config;
pub mod gateway;
pub mod llm;
