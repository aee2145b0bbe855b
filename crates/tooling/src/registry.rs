use crate::filesystem::{GetFileInfoTool, ListDirectoryTool, ReadFileTool, WriteFileTool};
use crate::tool::{Tool, ToolDescriptor};
use anyhow::Result;
use std::sync::Arc;

pub type SharedTool = Arc<dyn Tool>;

/// Ordered tool catalog. Tools are registered while the registry is built and
/// the registry is then shared read-only, so the catalog is fixed for the
/// lifetime of the process.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<SharedTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tools` in order. Fails on the first duplicate name.
    pub fn with_tools(tools: Vec<SharedTool>) -> Result<Self> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// The four filesystem tools, in the order they are advertised.
    pub fn with_filesystem_tools() -> Result<Self> {
        let tools: Vec<SharedTool> = vec![
            Arc::new(ReadFileTool),
            Arc::new(WriteFileTool),
            Arc::new(ListDirectoryTool),
            Arc::new(GetFileInfoTool),
        ];
        Self::with_tools(tools)
    }

    pub fn register(&mut self, tool: SharedTool) -> Result<()> {
        if self.is_registered(tool.name()) {
            anyhow::bail!("Tool '{}' is already registered", tool.name());
        }

        self.tools.push(tool);
        Ok(())
    }

    pub fn get_tool(&self, name: &str) -> Option<SharedTool> {
        self.tools.iter().find(|tool| tool.name() == name).cloned()
    }

    pub fn list_tools(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(|tool| tool.name().to_string())
            .collect()
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|tool| tool.descriptor()).collect()
    }

    pub fn function_schemas(&self) -> Vec<serde_json::Value> {
        self.tools
            .iter()
            .map(|tool| tool.descriptor().to_function_schema())
            .collect()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool.name() == name)
    }
}
