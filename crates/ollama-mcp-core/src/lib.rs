pub mod config;
pub mod logging;

pub use config::{Config, McpConfig, OllamaConfig, OpenRouterConfig, DEFAULT_SERVER_COMMAND};
