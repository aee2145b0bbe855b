use crate::errors::SessionError;
use async_trait::async_trait;
use ollama_mcp_core::McpConfig;
use rmcp::model::{CallToolRequestParam, ClientInfo, Implementation, RawContent};
use rmcp::service::RunningService;
use rmcp::transport::TokioChildProcess;
use rmcp::{RoleClient, ServiceExt};
use serde_json::Value;
use std::collections::HashMap;
use tokio::process::Command;
use tokio::sync::RwLock;
use tooling::{ToolDescriptor, ToolExecutor};
use tracing::{debug, info, warn};

/// First content item of a tool call, flattened to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReply {
    pub content_type: String,
    pub text: String,
    pub is_error: bool,
}

impl ToolReply {
    pub fn text(text: impl Into<String>, is_error: bool) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
            is_error,
        }
    }
}

/// Where tool calls are executed. Transport problems are `Err`; tool-level
/// failures come back as replies with `is_error` set.
#[async_trait]
pub trait ToolSession: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, SessionError>;

    async fn call_tool(
        &self,
        name: &str,
        arguments: &HashMap<String, Value>,
    ) -> Result<ToolReply, SessionError>;

    async fn close(&self) -> Result<(), SessionError> {
        Ok(())
    }
}

type McpClient = RunningService<RoleClient, ClientInfo>;

/// MCP client connection to a file operations server.
pub struct McpSession {
    service: RwLock<Option<McpClient>>,
}

impl McpSession {
    pub fn client_info() -> ClientInfo {
        ClientInfo {
            client_info: Implementation {
                name: "ollama-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Spawns the configured server and performs the MCP handshake over its
    /// stdio. The child is killed if the session is dropped without `close`.
    pub async fn connect(config: &McpConfig) -> Result<Self, SessionError> {
        let program = config.resolve_server_command();
        let command_line = program.display().to_string();

        let mut cmd = Command::new(&program);
        cmd.args(&config.server_args).kill_on_drop(true);
        if std::env::var_os("RUST_LOG").is_none() {
            cmd.env("RUST_LOG", "warn");
        }

        let transport = TokioChildProcess::new(cmd).map_err(|source| SessionError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let service = Self::client_info()
            .serve(transport)
            .await
            .map_err(|e| SessionError::Handshake(e.to_string()))?;

        info!(server = %command_line, "connected to MCP server");
        Ok(Self::from_running(service))
    }

    /// Wraps a client that has already completed its handshake.
    pub fn from_running(service: McpClient) -> Self {
        Self {
            service: RwLock::new(Some(service)),
        }
    }

    pub async fn server_name(&self) -> Option<String> {
        let guard = self.service.read().await;
        guard
            .as_ref()
            .and_then(|service| service.peer_info())
            .map(|info| info.server_info.name.clone())
    }
}

fn flatten_content(raw: &RawContent) -> (String, String) {
    match raw {
        RawContent::Text(text) => ("text".to_string(), text.text.clone()),
        other => {
            let content_type = match other {
                RawContent::Image(_) => "image",
                RawContent::Audio(_) => "audio",
                RawContent::Resource(_) => "resource",
                _ => "other",
            };
            let rendered = serde_json::to_string(other).unwrap_or_default();
            (content_type.to_string(), rendered)
        }
    }
}

#[async_trait]
impl ToolSession for McpSession {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, SessionError> {
        let guard = self.service.read().await;
        let service = guard.as_ref().ok_or(SessionError::Closed)?;

        let tools = service.list_all_tools().await?;
        Ok(tools
            .into_iter()
            .map(|tool| ToolDescriptor {
                name: tool.name.to_string(),
                description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
                input_schema: Value::Object(tool.input_schema.as_ref().clone()),
            })
            .collect())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &HashMap<String, Value>,
    ) -> Result<ToolReply, SessionError> {
        let guard = self.service.read().await;
        let service = guard.as_ref().ok_or(SessionError::Closed)?;

        debug!(tool = name, "calling tool over MCP");
        let result = service
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments: Some(arguments.clone().into_iter().collect()),
            })
            .await?;

        let is_error = result.is_error.unwrap_or(false);
        let Some(first) = result.content.first() else {
            return Ok(ToolReply::text("", is_error));
        };

        let (content_type, text) = flatten_content(&first.raw);
        Ok(ToolReply {
            content_type,
            text,
            is_error,
        })
    }

    async fn close(&self) -> Result<(), SessionError> {
        let Some(service) = self.service.write().await.take() else {
            return Ok(());
        };

        match service.cancel().await {
            Ok(reason) => {
                info!(?reason, "MCP session closed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "MCP service did not shut down cleanly");
                Err(SessionError::Transport(e.to_string()))
            }
        }
    }
}

/// Runs tools in the current process, without a server.
#[derive(Clone)]
pub struct LocalToolSession {
    executor: ToolExecutor,
}

impl LocalToolSession {
    pub fn new(executor: ToolExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ToolSession for LocalToolSession {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, SessionError> {
        Ok(self.executor.descriptors())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &HashMap<String, Value>,
    ) -> Result<ToolReply, SessionError> {
        let result = self.executor.execute(name, arguments.clone()).await;
        let is_error = result.is_error();
        Ok(ToolReply::text(result.into_text(), is_error))
    }
}
