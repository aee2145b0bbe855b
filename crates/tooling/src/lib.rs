pub mod executor;
pub mod filesystem;
pub mod registry;
pub mod tool;

pub use executor::ToolExecutor;
pub use filesystem::{GetFileInfoTool, ListDirectoryTool, ReadFileTool, WriteFileTool};
pub use registry::{SharedTool, ToolRegistry};
pub use tool::{Tool, ToolCall, ToolDescriptor, ToolError, ToolResult};
