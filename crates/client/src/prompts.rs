use crate::detector::TOOL_CALL_MARKER;
use tooling::{ToolCall, ToolDescriptor};

const CALL_EXAMPLE: &str =
    "{\n    \"name\": \"tool_name\",\n    \"arguments\": {\"parameter\": \"value\"}\n}";

/// First-turn prompt: the tool catalog, the marker format, then the request.
pub fn tool_prompt(tools: &[ToolDescriptor], user_message: &str) -> String {
    let catalog = tools
        .iter()
        .map(|tool| format!("- {}: {}", tool.name, tool.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an assistant with access to the following tools:\n\
         \n\
         {catalog}\n\
         \n\
         If the user asks for an operation that requires one of these tools, \
         answer in the format:\n\
         {TOOL_CALL_MARKER} {CALL_EXAMPLE}\n\
         \n\
         If no tool is needed, answer normally.\n\
         \n\
         User: {user_message}\n"
    )
}

/// Second-turn prompt carrying the executed call and its textual result.
pub fn follow_up_prompt(user_message: &str, call: &ToolCall, result: &str) -> String {
    format!(
        "The user asked: {user_message}\n\
         \n\
         I ran the tool {} with arguments {}\n\
         Result: {result}\n\
         \n\
         Give the user a clear answer based on this result.",
        call.name,
        call.arguments_json()
    )
}
