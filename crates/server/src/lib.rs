pub mod handler;

pub use handler::FileOperationsServer;

use anyhow::{Context, Result};
use rmcp::ServiceExt;
use tracing::info;

/// Serves the filesystem tools over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: FileOperationsServer) -> Result<()> {
    info!(
        tools = server.executor().registry().tool_count(),
        "file operations MCP server listening on stdio"
    );

    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .context("MCP handshake on stdio failed")?;

    let reason = running.waiting().await.context("MCP service task failed")?;
    info!(?reason, "MCP client disconnected");
    Ok(())
}
