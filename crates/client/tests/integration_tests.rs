use async_trait::async_trait;
use client::{AgentService, McpSession, ToolSession};
use llm::{CompletionProvider, LlmError};
use rmcp::ServiceExt;
use serde_json::{json, Value};
use server::FileOperationsServer;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tooling::{ToolExecutor, ToolResult};

/// Answers each first-turn prompt with the next scripted tool call and every
/// follow-up prompt with a fixed acknowledgement.
struct ScriptedModel {
    calls: Mutex<VecDeque<Value>>,
    follow_ups: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(calls: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(calls.into()),
            follow_ups: Mutex::default(),
        })
    }
}

#[async_trait]
impl CompletionProvider for ScriptedModel {
    async fn complete(&self, prompt: &str, _tools: Option<&[Value]>) -> Result<String, LlmError> {
        if prompt.starts_with("The user asked:") {
            self.follow_ups.lock().unwrap().push(prompt.to_string());
            return Ok("Done.".to_string());
        }
        Ok(match self.calls.lock().unwrap().pop_front() {
            Some(call) => format!("Let me do that.\nTOOL_CALL: {call}"),
            None => "Nothing to do.".to_string(),
        })
    }
}

async fn mcp_session() -> Arc<McpSession> {
    let (server_io, client_io) = tokio::io::duplex(8192);
    tokio::spawn(async move {
        let executor = ToolExecutor::with_filesystem_tools()?;
        let running = FileOperationsServer::new(executor).serve(server_io).await?;
        running.waiting().await?;
        anyhow::Ok(())
    });

    let service = McpSession::client_info().serve(client_io).await.unwrap();
    Arc::new(McpSession::from_running(service))
}

#[tokio::test]
async fn should_run_demo_flow_over_mcp() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_str().unwrap().to_string();
    let file = dir.path().join("demo.txt").to_str().unwrap().to_string();

    let model = ScriptedModel::new(vec![
        json!({"name": "list_directory", "arguments": {"path": &root}}),
        json!({"name": "write_file", "arguments": {"path": &file, "content": "Hello from MCP!"}}),
        json!({"name": "read_file", "arguments": {"path": &file}}),
        json!({"name": "get_file_info", "arguments": {"path": &file}}),
    ]);
    let session = mcp_session().await;
    let agent = AgentService::with_clients(model.clone(), session.clone(), false)
        .await
        .unwrap();
    assert_eq!(agent.tools().len(), 4);

    let listed = agent.run_turn("list the directory").await;
    let written = agent.run_turn("create demo.txt").await;
    let read = agent.run_turn("read demo.txt").await;
    let info = agent.run_turn("info about demo.txt").await;

    assert_eq!(
        listed.tool_result,
        Some(ToolResult::Text(format!("Contents of directory {root}:\n")))
    );
    assert_eq!(
        written.tool_result,
        Some(ToolResult::Text(format!("File {file} written successfully")))
    );
    assert_eq!(
        read.tool_result,
        Some(ToolResult::Text(format!("Contents of file {file}:\n\nHello from MCP!")))
    );
    let info_text = info.tool_result.unwrap().into_text();
    assert!(info_text.contains("• Size: 15 bytes"));
    assert!(info_text.contains("• Type: File"));

    let follow_ups = model.follow_ups.lock().unwrap().clone();
    assert_eq!(follow_ups.len(), 4);
    assert!(follow_ups[2].contains("Result: Contents of file"));
    let closing = "Give the user a clear answer based on this result.";
    assert!(follow_ups.iter().all(|p| p.ends_with(closing)));
    assert_eq!(info.final_reply, "Done.");

    agent.shutdown().await.unwrap();
}

#[tokio::test]
async fn should_surface_closed_session_in_reply_flow() {
    let call = json!({"name": "read_file", "arguments": {"path": "x"}});
    let model = ScriptedModel::new(vec![call]);
    let session = mcp_session().await;
    let agent = AgentService::with_clients(model.clone(), session.clone(), false)
        .await
        .unwrap();
    session.close().await.unwrap();

    let turn = agent.run_turn("read x").await;

    assert_eq!(
        turn.tool_result,
        Some(ToolResult::Error("Error executing tool: MCP session is closed".to_string()))
    );
    assert_eq!(turn.final_reply, "Done.");
}

#[tokio::test]
async fn should_report_unknown_tool_from_server() {
    let call = json!({"name": "delete_file", "arguments": {"path": "x"}});
    let model = ScriptedModel::new(vec![call]);
    let session = mcp_session().await;
    let agent = AgentService::with_clients(model, session, false)
        .await
        .unwrap();

    let turn = agent.run_turn("delete x").await;

    assert_eq!(
        turn.tool_result,
        Some(ToolResult::Error("Unknown tool: delete_file".to_string()))
    );
    agent.shutdown().await.unwrap();
}
