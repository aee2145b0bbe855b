use crate::registry::ToolRegistry;
use crate::tool::{ToolCall, ToolDescriptor, ToolResult};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Dispatches tool calls by name against a fixed registry.
///
/// `execute` never fails: unknown tools, bad arguments and filesystem errors
/// all come back as [`ToolResult::Error`] text.
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Executor over the four filesystem tools.
    pub fn with_filesystem_tools() -> Result<Self> {
        let registry = ToolRegistry::with_filesystem_tools()?;
        Ok(Self::new(Arc::new(registry)))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry.descriptors()
    }

    pub async fn execute(
        &self,
        name: &str,
        arguments: HashMap<String, serde_json::Value>,
    ) -> ToolResult {
        self.execute_call(&ToolCall {
            name: name.to_string(),
            arguments,
        })
        .await
    }

    pub async fn execute_call(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.registry.get_tool(&call.name) else {
            warn!(tool = %call.name, "unknown tool requested");
            return ToolResult::Error(format!("Unknown tool: {}", call.name));
        };

        debug!(tool = %call.name, arguments = %call.arguments_json(), "executing tool");

        match tool.execute(call).await {
            Ok(text) => ToolResult::Text(text),
            Err(error) => {
                warn!(tool = %error.tool_name, error = %error.message, "tool failed");
                ToolResult::Error(error.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn args(pairs: &[(&str, &str)]) -> HashMap<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[tokio::test]
    async fn should_report_unknown_tool_without_failing() {
        let executor = ToolExecutor::with_filesystem_tools().unwrap();

        let result = executor.execute("delete_everything", HashMap::new()).await;

        assert_eq!(
            result,
            ToolResult::Error("Unknown tool: delete_everything".to_string())
        );
    }

    #[tokio::test]
    async fn should_report_unknown_tool_for_every_unregistered_name() {
        let executor = ToolExecutor::with_filesystem_tools().unwrap();

        for name in ["", "READ_FILE", "read_file ", "list_dir"] {
            let result = executor.execute(name, HashMap::new()).await;
            assert!(result.is_error());
            assert!(result.text().contains("Unknown tool"));
        }
    }

    #[tokio::test]
    async fn should_round_trip_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("round.txt");
        let path_str = path.to_str().unwrap();
        let executor = ToolExecutor::with_filesystem_tools().unwrap();

        let before = executor
            .execute("read_file", args(&[("path", path_str)]))
            .await;
        assert!(before.is_error());

        let written = executor
            .execute(
                "write_file",
                args(&[("path", path_str), ("content", "Hello from MCP!")]),
            )
            .await;
        assert_eq!(
            written,
            ToolResult::Text(format!("File {path_str} written successfully"))
        );

        let read = executor
            .execute("read_file", args(&[("path", path_str)]))
            .await;
        assert_eq!(
            read,
            ToolResult::Text(format!("Contents of file {path_str}:\n\nHello from MCP!"))
        );
    }

    #[tokio::test]
    async fn should_return_error_result_for_missing_file_info() {
        let executor = ToolExecutor::with_filesystem_tools().unwrap();

        let result = executor
            .execute("get_file_info", args(&[("path", "/definitely/not/here")]))
            .await;

        assert!(result.is_error());
        assert!(result.text().starts_with("Error getting file info:"));
    }

    #[tokio::test]
    async fn should_return_error_result_for_bad_argument_type() {
        let executor = ToolExecutor::with_filesystem_tools().unwrap();
        let mut arguments = HashMap::new();
        arguments.insert("path".to_string(), json!(["not", "a", "string"]));

        let result = executor.execute("list_directory", arguments).await;

        assert!(result.is_error());
        assert!(result
            .text()
            .starts_with("Error listing directory: invalid argument 'path'"));
    }

    #[test]
    fn should_expose_registry_descriptors() {
        let executor = ToolExecutor::with_filesystem_tools().unwrap();
        let names: Vec<String> = executor.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, executor.registry().list_tools());
    }
}
