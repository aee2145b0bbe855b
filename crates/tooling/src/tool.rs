use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A request to run one tool, as parsed from model output or received over MCP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_argument<T: Serialize>(mut self, key: &str, value: T) -> Result<Self> {
        let json_value = serde_json::to_value(value)?;
        self.arguments.insert(key.to_string(), json_value);
        Ok(self)
    }

    pub fn get_argument<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .arguments
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("missing required argument '{}'", key))?;

        let result: T = serde_json::from_value(value.clone())
            .map_err(|e| anyhow::anyhow!("invalid argument '{}': {}", key, e))?;
        Ok(result)
    }

    /// Arguments rendered as a JSON object, for prompts and logs.
    pub fn arguments_json(&self) -> String {
        serde_json::to_string(&self.arguments).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Outcome of a tool execution. Both variants carry user-facing text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolResult {
    Text(String),
    Error(String),
}

impl ToolResult {
    pub fn text(&self) -> &str {
        match self {
            ToolResult::Text(text) | ToolResult::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error(_))
    }

    pub fn into_text(self) -> String {
        match self {
            ToolResult::Text(text) | ToolResult::Error(text) => text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolError {
    pub tool_name: String,
    pub message: String,
}

impl ToolError {
    pub fn new(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ToolError {}

/// Name, description and JSON schema of a tool, as advertised to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl ToolDescriptor {
    /// Function-calling shape understood by the model server.
    pub fn to_function_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.input_schema,
            }
        })
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> serde_json::Value;

    /// Runs the tool and returns its success text. Failures are returned as
    /// `ToolError` whose message is already phrased for the user.
    async fn execute(&self, call: &ToolCall) -> Result<String, ToolError>;

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_create_tool_call() {
        let call = ToolCall::new("read_file");
        assert_eq!(call.name, "read_file");
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn should_retrieve_arguments_from_tool_call() {
        let call = ToolCall::new("write_file")
            .with_argument("path", "/tmp/out.txt")
            .unwrap()
            .with_argument("content", "hello")
            .unwrap();

        let path: String = call.get_argument("path").unwrap();
        let content: String = call.get_argument("content").unwrap();

        assert_eq!(path, "/tmp/out.txt");
        assert_eq!(content, "hello");
    }

    #[test]
    fn should_fail_to_get_missing_argument() {
        let call = ToolCall::new("read_file");
        let result: Result<String> = call.get_argument("path");

        assert_eq!(
            result.unwrap_err().to_string(),
            "missing required argument 'path'"
        );
    }

    #[test]
    fn should_fail_to_get_argument_of_wrong_type() {
        let call = ToolCall::new("read_file")
            .with_argument("path", 42)
            .unwrap();
        let result: Result<String> = call.get_argument("path");

        assert!(result
            .unwrap_err()
            .to_string()
            .starts_with("invalid argument 'path'"));
    }

    #[test]
    fn should_render_arguments_as_json() {
        let call = ToolCall::new("list_directory")
            .with_argument("path", ".")
            .unwrap();
        assert_eq!(call.arguments_json(), r#"{"path":"."}"#);
    }

    #[test]
    fn should_expose_tool_result_text_for_both_variants() {
        let ok = ToolResult::Text("done".to_string());
        let err = ToolResult::Error("Unknown tool: x".to_string());

        assert_eq!(ok.text(), "done");
        assert!(!ok.is_error());
        assert_eq!(err.text(), "Unknown tool: x");
        assert!(err.is_error());
        assert_eq!(err.into_text(), "Unknown tool: x");
    }

    #[test]
    fn should_display_tool_error_message() {
        let error = ToolError::new("read_file", "Error reading file: denied");
        assert_eq!(error.tool_name, "read_file");
        assert_eq!(error.to_string(), "Error reading file: denied");
    }

    #[test]
    fn should_build_function_schema_from_descriptor() {
        let descriptor = ToolDescriptor {
            name: "read_file".to_string(),
            description: "Reads the contents of a file".to_string(),
            input_schema: json!({"type": "object"}),
        };

        let schema = descriptor.to_function_schema();

        assert_eq!(schema["type"], "function");
        assert_eq!(schema["function"]["name"], "read_file");
        assert_eq!(
            schema["function"]["description"],
            "Reads the contents of a file"
        );
        assert_eq!(schema["function"]["parameters"], json!({"type": "object"}));
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes its input"
        }

        fn parameters(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": {"input": {"type": "string"}},
                "required": ["input"]
            })
        }

        async fn execute(&self, call: &ToolCall) -> Result<String, ToolError> {
            let input: String = call
                .get_argument("input")
                .map_err(|e| ToolError::new(self.name(), e.to_string()))?;
            Ok(format!("Echo: {input}"))
        }
    }

    #[tokio::test]
    async fn should_execute_tool_through_trait() {
        let call = ToolCall::new("echo").with_argument("input", "hi").unwrap();
        assert_eq!(EchoTool.execute(&call).await.unwrap(), "Echo: hi");
    }

    #[test]
    fn should_derive_descriptor_from_tool() {
        let descriptor = EchoTool.descriptor();
        assert_eq!(descriptor.name, "echo");
        assert_eq!(descriptor.description, "Echoes its input");
        assert_eq!(descriptor.input_schema["required"], json!(["input"]));
    }
}
