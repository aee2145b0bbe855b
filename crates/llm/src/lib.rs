pub mod models;
pub mod ollama;
pub mod openrouter;

use async_trait::async_trait;

pub use models::{ChatMessage, ModelConfig, OpenRouterSettings};
pub use ollama::OllamaClient;
pub use openrouter::{mask_key, OpenRouterClient};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Error contacting {service}: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {service}: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Request { source, .. } => source.is_timeout() || source.is_connect(),
            LlmError::Status { status, .. } => *status == 429 || *status >= 500,
            LlmError::Decode { .. } => false,
        }
    }
}

/// A text-completion backend. `tools` carries function-calling schemas the
/// backend may forward to the model; implementations may ignore them.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        tools: Option<&[serde_json::Value]>,
    ) -> Result<String, LlmError>;
}
