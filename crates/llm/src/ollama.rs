use crate::models::{GenerateRequest, GenerateResponse, ModelConfig, TagsResponse};
use crate::{CompletionProvider, LlmError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use std::time::Duration;

const SERVICE: &str = "Ollama";
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for a local Ollama server's non-streaming generate endpoint.
pub struct OllamaClient {
    config: ModelConfig,
    client: Client,
}

impl OllamaClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        info!(
            "Initializing OllamaClient for model {} at {}",
            config.model, config.host
        );
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.host.trim_end_matches('/'), path)
    }

    /// One completion. No retries: a failed request is reported to the caller.
    pub async fn generate(
        &self,
        prompt: &str,
        tools: Option<&[serde_json::Value]>,
    ) -> Result<String, LlmError> {
        let request = GenerateRequest::new(&self.config.model, prompt, tools);
        debug!(
            "Sending generate request to {} (prompt: {} chars, tools: {})",
            self.config.model, prompt.len(), request.tools.map_or(0, |t| t.len())
        );

        let response = self
            .client
            .post(self.url("/api/generate"))
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
            warn!("Ollama returned HTTP {}: {}", status, body);
            return Err(LlmError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| LlmError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;

        debug!(
            "Received {} chars from {}",
            generated.response.len(), self.config.model
        );
        Ok(generated.response)
    }

    /// Lists installed models via `/api/tags`; succeeds only when the server is up.
    pub async fn health_check(&self) -> Result<Vec<String>, LlmError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
            .map_err(|source| LlmError::Request {
                service: SERVICE,
                source,
            })?;

        if !response.status().is_success() {
            return Err(LlmError::Status {
                service: SERVICE,
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let tags: TagsResponse = response.json().await.map_err(|e| LlmError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether `installed` contains the configured model. A bare name such as
    /// `llama3.2` matches the `llama3.2:latest` tag Ollama reports.
    pub fn has_model(&self, installed: &[String]) -> bool {
        let wanted = self.config.model.as_str();
        installed.iter().any(|name| {
            name == wanted || (!wanted.contains(':') && *name == format!("{wanted}:latest"))
        })
    }
}

#[async_trait]
impl CompletionProvider for OllamaClient {
    async fn complete(
        &self,
        prompt: &str,
        tools: Option<&[serde_json::Value]>,
    ) -> Result<String, LlmError> {
        self.generate(prompt, tools).await
    }
}
