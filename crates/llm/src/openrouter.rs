use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, OpenRouterSettings};
use crate::LlmError;
use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

const SERVICE: &str = "OpenRouter";

/// Minimal chat-completions client used to check that API keys still work.
pub struct OpenRouterClient {
    settings: OpenRouterSettings,
    client: Client,
}

impl OpenRouterClient {
    pub fn new(settings: OpenRouterSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { settings, client })
    }

    /// Sends `prompt` with `api_key` and returns the first choice's content.
    pub async fn check_key(&self, api_key: &str, prompt: &str) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::user(prompt.to_string())],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        debug!(
            "Probing {} with key {}",
            self.settings.model, mask_key(api_key)
        );

        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| LlmError::Request {
                service: SERVICE,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(
                "OpenRouter returned HTTP {} for key {}",
                status, mask_key(api_key)
            );
            return Err(LlmError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(|e| LlmError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::Decode {
                service: SERVICE,
                message: "response contained no choices".to_string(),
            })
    }
}

/// Keeps the first and last four characters of a key for display.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
