use ollama_mcp_core::{OllamaConfig, OpenRouterConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: String) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 60,
        }
    }
}

impl From<&OllamaConfig> for ModelConfig {
    fn from(config: &OllamaConfig) -> Self {
        Self {
            host: config.host.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<&'a [serde_json::Value]>,
}

impl<'a> GenerateRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, tools: Option<&'a [serde_json::Value]>) -> Self {
        Self {
            model,
            prompt,
            stream: false,
            tools: tools.filter(|tools| !tools.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
}

/// Body of `GET /api/tags`.
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenRouterSettings {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for OpenRouterSettings {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "qwen/qwen3-14b:free".to_string(),
            max_tokens: 30000,
            temperature: 0.01,
            timeout_secs: 60,
        }
    }
}

impl From<&OpenRouterConfig> for OpenRouterSettings {
    fn from(config: &OpenRouterConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        }
    }
}

/// Body of an OpenAI-compatible `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_create_user_message() {
        let msg = ChatMessage::user("Hello".to_string());
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn should_create_default_model_config() {
        let config = ModelConfig::default();
        assert_eq!(config.host, "http://localhost:11434");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn should_build_model_config_from_ollama_section() {
        let section = OllamaConfig {
            host: "http://gpu-box:11434".to_string(),
            model: "qwen2.5:7b".to_string(),
            timeout_secs: 120,
            send_tool_schemas: false,
        };

        let config = ModelConfig::from(&section);

        assert_eq!(config.host, "http://gpu-box:11434");
        assert_eq!(config.model, "qwen2.5:7b");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn should_serialize_generate_request_without_tools() {
        let request = GenerateRequest::new("llama3.2", "hi", None);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            json!({"model": "llama3.2", "prompt": "hi", "stream": false})
        );
    }

    #[test]
    fn should_omit_empty_tools_list() {
        let tools: Vec<serde_json::Value> = vec![];
        let request = GenerateRequest::new("llama3.2", "hi", Some(&tools));
        let json = serde_json::to_value(&request).unwrap();

        assert!(json.get("tools").is_none());
    }

    #[test]
    fn should_serialize_generate_request_with_tools() {
        let tool = json!({"type": "function", "function": {"name": "read_file"}});
        let tools = vec![tool];
        let request = GenerateRequest::new("llama3.2", "hi", Some(&tools));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["tools"][0]["function"]["name"], "read_file");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn should_default_missing_response_field() {
        let response: GenerateResponse = serde_json::from_str(r#"{"done": true}"#).unwrap();
        assert_eq!(response.response, "");
    }

    #[test]
    fn should_deserialize_tags_response() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models": [{"name": "llama3.2:latest", "size": 1}, {"name": "phi3:mini"}]}"#,
        )
        .unwrap();

        let names: Vec<&str> = tags.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["llama3.2:latest", "phi3:mini"]);
    }

    #[test]
    fn should_deserialize_chat_completion_response() {
        let body = json!({
            "model": "qwen/qwen3-14b",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "I am Qwen."}}]
        });

        let response: ChatCompletionResponse = serde_json::from_value(body).unwrap();

        let message = &response.choices[0].message;
        assert_eq!(response.model.as_deref(), Some("qwen/qwen3-14b"));
        assert_eq!(message.role, "assistant");
        assert_eq!(message.content, "I am Qwen.");
    }
}
