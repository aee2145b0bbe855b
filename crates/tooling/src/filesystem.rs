//! The four filesystem tools exposed by the server.
//!
//! Every tool reports failures as a [`ToolError`] whose message is the final,
//! user-facing text (`Error reading file: ...` and so on). Nothing here locks
//! the filesystem; concurrent external changes are observed as they happen.

use crate::tool::{Tool, ToolCall, ToolError};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde_json::json;
use std::fs::Metadata;
use tokio::fs;

fn path_schema(description: &str) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "path": {
                "type": "string",
                "description": description
            }
        },
        "required": ["path"]
    })
}

fn string_argument(call: &ToolCall, key: &str, prefix: &str) -> Result<String, ToolError> {
    call.get_argument::<String>(key)
        .map_err(|e| ToolError::new(&call.name, format!("{prefix}: {e}")))
}

pub struct ReadFileTool;

impl ReadFileTool {
    const ERROR_PREFIX: &'static str = "Error reading file";
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads the contents of a file"
    }

    fn parameters(&self) -> serde_json::Value {
        path_schema("Path to the file")
    }

    async fn execute(&self, call: &ToolCall) -> Result<String, ToolError> {
        let path = string_argument(call, "path", Self::ERROR_PREFIX)?;

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| ToolError::new(self.name(), format!("{}: {e}", Self::ERROR_PREFIX)))?;

        Ok(format!("Contents of file {path}:\n\n{content}"))
    }
}

pub struct WriteFileTool;

impl WriteFileTool {
    const ERROR_PREFIX: &'static str = "Error writing file";
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes content to a file"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> Result<String, ToolError> {
        let path = string_argument(call, "path", Self::ERROR_PREFIX)?;
        let content = string_argument(call, "content", Self::ERROR_PREFIX)?;

        fs::write(&path, content)
            .await
            .map_err(|e| ToolError::new(self.name(), format!("{}: {e}", Self::ERROR_PREFIX)))?;

        Ok(format!("File {path} written successfully"))
    }
}

pub struct ListDirectoryTool;

impl ListDirectoryTool {
    const ERROR_PREFIX: &'static str = "Error listing directory";

    fn format_entry(name: &str, is_dir: bool, size: u64) -> String {
        if is_dir {
            format!("📁 {name}/")
        } else {
            format!("📄 {name} ({size} bytes)")
        }
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "Shows the contents of a directory"
    }

    fn parameters(&self) -> serde_json::Value {
        path_schema("Path to the directory")
    }

    async fn execute(&self, call: &ToolCall) -> Result<String, ToolError> {
        let path = string_argument(call, "path", Self::ERROR_PREFIX)?;
        let fail = |e: std::io::Error| {
            ToolError::new("list_directory", format!("{}: {e}", Self::ERROR_PREFIX))
        };

        let mut dir_entries = fs::read_dir(&path).await.map_err(fail)?;
        let mut entries = Vec::new();

        while let Some(entry) = dir_entries.next_entry().await.map_err(fail)? {
            let name = entry.file_name().to_string_lossy().to_string();
            // Follow symlinks; a dangling link is listed by its own metadata.
            let metadata = match fs::metadata(entry.path()).await {
                Ok(metadata) => metadata,
                Err(_) => entry.metadata().await.map_err(fail)?,
            };
            entries.push((name, metadata.is_dir(), metadata.len()));
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let lines: Vec<String> = entries
            .iter()
            .map(|(name, is_dir, size)| Self::format_entry(name, *is_dir, *size))
            .collect();

        Ok(format!("Contents of directory {path}:\n{}", lines.join("\n")))
    }
}

pub struct GetFileInfoTool;

impl GetFileInfoTool {
    const ERROR_PREFIX: &'static str = "Error getting file info";

    fn format_modified(metadata: &Metadata) -> std::io::Result<String> {
        let modified: DateTime<Local> = metadata.modified()?.into();
        Ok(modified.format("%Y-%m-%d %H:%M:%S").to_string())
    }

    #[cfg(unix)]
    fn format_permissions(metadata: &Metadata) -> String {
        use std::os::unix::fs::PermissionsExt;
        format!("{:03o}", metadata.permissions().mode() & 0o777)
    }

    #[cfg(not(unix))]
    fn format_permissions(metadata: &Metadata) -> String {
        if metadata.permissions().readonly() {
            "444".to_string()
        } else {
            "666".to_string()
        }
    }
}

#[async_trait]
impl Tool for GetFileInfoTool {
    fn name(&self) -> &str {
        "get_file_info"
    }

    fn description(&self) -> &str {
        "Gets information about a file (size, modification date)"
    }

    fn parameters(&self) -> serde_json::Value {
        path_schema("Path to the file")
    }

    async fn execute(&self, call: &ToolCall) -> Result<String, ToolError> {
        let path = string_argument(call, "path", Self::ERROR_PREFIX)?;
        let fail = |e: std::io::Error| {
            ToolError::new("get_file_info", format!("{}: {e}", Self::ERROR_PREFIX))
        };

        let metadata = fs::metadata(&path).await.map_err(fail)?;
        let modified = Self::format_modified(&metadata).map_err(fail)?;
        let kind = if metadata.is_dir() { "Directory" } else { "File" };

        Ok(format!(
            "Information about {path}:\n\
             • Size: {} bytes\n\
             • Modified: {modified}\n\
             • Permissions: {}\n\
             • Type: {kind}",
            metadata.len(),
            Self::format_permissions(&metadata),
        ))
    }
}
