use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tooling::{ToolDescriptor, ToolExecutor, ToolResult};
use tracing::{debug, info};

const INSTRUCTIONS: &str = "File operations server. Tools: read_file, write_file, \
list_directory, get_file_info. Paths are resolved against the server's working directory.";

/// MCP front end for the filesystem tool executor.
#[derive(Clone)]
pub struct FileOperationsServer {
    executor: ToolExecutor,
}

impl FileOperationsServer {
    pub fn new(executor: ToolExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    fn mcp_tools(&self) -> Vec<Tool> {
        self.executor
            .descriptors()
            .into_iter()
            .map(to_mcp_tool)
            .collect()
    }
}

fn to_mcp_tool(descriptor: ToolDescriptor) -> Tool {
    let schema = match descriptor.input_schema {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    Tool::new(descriptor.name, descriptor.description, Arc::new(schema))
}

fn to_call_result(result: ToolResult) -> CallToolResult {
    match result {
        ToolResult::Text(text) => CallToolResult::success(vec![Content::text(text)]),
        ToolResult::Error(text) => CallToolResult::error(vec![Content::text(text)]),
    }
}

impl ServerHandler for FileOperationsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "file-operations".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        debug!("listing tools");
        Ok(ListToolsResult::with_all_items(self.mcp_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments: HashMap<String, Value> =
            request.arguments.unwrap_or_default().into_iter().collect();

        info!(tool = %request.name, "tool call received");
        let result = self.executor.execute(&request.name, arguments).await;
        Ok(to_call_result(result))
    }
}
