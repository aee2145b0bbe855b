use crate::detector::{Detection, ToolCallDetector};
use crate::errors::AgentError;
use crate::prompts;
use crate::session::{LocalToolSession, McpSession, ToolSession};
use llm::{CompletionProvider, ModelConfig, OllamaClient};
use ollama_mcp_core::Config;
use serde_json::Value;
use std::sync::Arc;
use tooling::{ToolCall, ToolDescriptor, ToolExecutor, ToolResult};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const EMPTY_TOOL_RESULT: &str = "Tool executed but returned no content";

/// Everything that happened for one user message.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub turn_id: Uuid,
    pub user_message: String,
    pub first_reply: String,
    pub tool_call: Option<ToolCall>,
    pub tool_result: Option<ToolResult>,
    pub final_reply: String,
}

pub struct AgentService {
    provider: Arc<dyn CompletionProvider>,
    session: Arc<dyn ToolSession>,
    detector: ToolCallDetector,
    tools: Vec<ToolDescriptor>,
    function_schemas: Vec<Value>,
    send_tool_schemas: bool,
}

impl std::fmt::Debug for AgentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentService")
            .field("provider", &"CompletionProvider<...>")
            .field("session", &"ToolSession<...>")
            .field("tools", &self.tools.len())
            .field("send_tool_schemas", &self.send_tool_schemas)
            .finish()
    }
}

impl AgentService {
    /// Builds the Ollama client and opens the tool session: an MCP server
    /// subprocess, or the in-process executor when `in_process` is set.
    pub async fn connect(config: &Config, in_process: bool) -> Result<Self, AgentError> {
        let provider = OllamaClient::new(ModelConfig::from(&config.ollama))
            .map_err(|e| AgentError::Config(format!("{e:#}")))?;

        let session: Arc<dyn ToolSession> = if in_process {
            info!("running tools in-process");
            let executor = ToolExecutor::with_filesystem_tools()
                .map_err(|e| AgentError::Config(format!("{e:#}")))?;
            Arc::new(LocalToolSession::new(executor))
        } else {
            Arc::new(McpSession::connect(&config.mcp).await?)
        };

        let send_tool_schemas = config.ollama.send_tool_schemas;
        match Self::with_clients(Arc::new(provider), session.clone(), send_tool_schemas).await {
            Ok(agent) => Ok(agent),
            Err(e) => {
                let _ = session.close().await;
                Err(e)
            }
        }
    }

    /// Creates an AgentService over the given collaborators and fetches the
    /// tool catalog once.
    pub async fn with_clients(
        provider: Arc<dyn CompletionProvider>,
        session: Arc<dyn ToolSession>,
        send_tool_schemas: bool,
    ) -> Result<Self, AgentError> {
        let tools = session.list_tools().await?;
        let function_schemas = tools
            .iter()
            .map(ToolDescriptor::to_function_schema)
            .collect();

        info!(
            tools = ?tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "tool catalog loaded"
        );

        Ok(Self {
            provider,
            session,
            detector: ToolCallDetector::default(),
            tools,
            function_schemas,
            send_tool_schemas,
        })
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub async fn chat_with_tools(&self, user_message: &str) -> String {
        self.run_turn(user_message).await.final_reply
    }

    /// One request through to its final reply with at most one tool call.
    /// Failures are reported in the reply text; this never errors.
    pub async fn run_turn(&self, user_message: &str) -> ConversationTurn {
        let turn_id = Uuid::new_v4();
        let span = info_span!("turn", %turn_id);
        self.run_turn_inner(turn_id, user_message)
            .instrument(span)
            .await
    }

    async fn run_turn_inner(&self, turn_id: Uuid, user_message: &str) -> ConversationTurn {
        let mut turn = ConversationTurn {
            turn_id,
            user_message: user_message.to_string(),
            first_reply: String::new(),
            tool_call: None,
            tool_result: None,
            final_reply: String::new(),
        };

        let prompt = prompts::tool_prompt(&self.tools, user_message);
        let schemas = self
            .send_tool_schemas
            .then_some(self.function_schemas.as_slice());

        let first_reply = match self.provider.complete(&prompt, schemas).await {
            Ok(reply) => reply,
            Err(e) => {
                let text = e.to_string();
                log_failure(AgentError::from(e), "first completion failed");
                turn.final_reply = text.clone();
                turn.first_reply = text;
                return turn;
            }
        };
        turn.first_reply = first_reply;

        match self.detector.detect(&turn.first_reply) {
            Detection::NoCall => {
                debug!("reply contains no tool call");
                turn.final_reply = turn.first_reply.clone();
            }
            Detection::ParseFailure { reason, original } => {
                warn!(%reason, "could not parse tool call");
                turn.final_reply = format!(
                    "Error processing tool call: {reason}\n\nOriginal response: {original}"
                );
            }
            Detection::Call(call) => {
                let result = self.dispatch(&call).await;
                let follow_up = prompts::follow_up_prompt(user_message, &call, result.text());

                turn.final_reply = match self.provider.complete(&follow_up, None).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        let text = e.to_string();
                        log_failure(AgentError::from(e), "follow-up completion failed");
                        text
                    }
                };
                turn.tool_call = Some(call);
                turn.tool_result = Some(result);
            }
        }

        turn
    }

    async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        info!(tool = %call.name, arguments = %call.arguments_json(), "dispatching tool call");

        match self.session.call_tool(&call.name, &call.arguments).await {
            Ok(reply) if reply.text.is_empty() => {
                if reply.is_error {
                    ToolResult::Error(EMPTY_TOOL_RESULT.to_string())
                } else {
                    ToolResult::Text(EMPTY_TOOL_RESULT.to_string())
                }
            }
            Ok(reply) if reply.is_error => ToolResult::Error(reply.text),
            Ok(reply) => ToolResult::Text(reply.text),
            Err(e) => {
                let text = format!("Error executing tool: {e}");
                log_failure(AgentError::from(e), "tool session failed");
                ToolResult::Error(text)
            }
        }
    }

    /// Releases the tool session. Safe to call more than once.
    pub async fn shutdown(&self) -> Result<(), AgentError> {
        self.session.close().await?;
        Ok(())
    }
}

fn log_failure(error: AgentError, context: &str) {
    warn!(error = %error, retryable = error.is_retryable(), "{context}");
}
