use server::FileOperationsServer;
use tooling::ToolExecutor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol; logs must stay on stderr.
    ollama_mcp_core::logging::init("info");

    let executor = ToolExecutor::with_filesystem_tools()?;
    server::serve_stdio(FileOperationsServer::new(executor)).await
}
