use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_SERVER_COMMAND: &str = "fs-mcp-server";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ollama: OllamaConfig,
    pub mcp: McpConfig,
    pub openrouter: OpenRouterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Attach the function-calling schemas to the first completion request.
    pub send_tool_schemas: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 60,
            send_tool_schemas: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    pub server_command: String,
    pub server_args: Vec<String>,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            server_command: DEFAULT_SERVER_COMMAND.to_string(),
            server_args: Vec::new(),
        }
    }
}

impl McpConfig {
    /// Resolves the server executable. The bare default name prefers a binary
    /// sitting next to the current executable (the usual `cargo build` layout)
    /// and otherwise falls back to a `PATH` lookup.
    pub fn resolve_server_command(&self) -> PathBuf {
        if self.server_command == DEFAULT_SERVER_COMMAND {
            if let Some(sibling) = sibling_executable(DEFAULT_SERVER_COMMAND) {
                return sibling;
            }
        }
        PathBuf::from(&self.server_command)
    }
}

fn sibling_executable(name: &str) -> Option<PathBuf> {
    let current = env::current_exe().ok()?;
    let candidate = current
        .parent()?
        .join(format!("{name}{}", env::consts::EXE_SUFFIX));
    candidate.is_file().then_some(candidate)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    pub base_url: String,
    pub model: String,
    pub key_env_vars: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub check_prompt: String,
    pub timeout_secs: u64,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "qwen/qwen3-14b:free".to_string(),
            key_env_vars: vec![
                "OPENROUTER_API_KEY".to_string(),
                "OPENROUTER_API_KEY2".to_string(),
            ],
            max_tokens: 30000,
            temperature: 0.01,
            check_prompt: "hi! What model are you?".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path).with_context(|| format!("Failed to load config from {}", path.display()))
    }

    /// `explicit` if given, otherwise `CONFIG_PATH`, otherwise the default path.
    pub fn config_path(explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => env::var("CONFIG_PATH")
                .unwrap_or_else(|_| Self::default_config_path())
                .into(),
        }
    }

    pub fn default_config_path() -> String {
        "./ollama-mcp.toml".to_string()
    }

    pub fn with_env_overrides(&self) -> Self {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup; `with_env_overrides` feeds
    /// it the process environment.
    pub fn with_overrides_from<F>(&self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.clone();
        if let Some(host) = lookup("OLLAMA_HOST") {
            config.ollama.host = host;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            config.ollama.model = model;
        }
        if let Some(command) = lookup("MCP_SERVER_COMMAND") {
            config.mcp.server_command = command;
        }
        if let Some(url) = lookup("OPENROUTER_BASE_URL") {
            config.openrouter.base_url = url;
        }
        if let Some(model) = lookup("OPENROUTER_MODEL") {
            config.openrouter.model = model;
        }
        config
    }
}
