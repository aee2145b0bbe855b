pub mod agent;
pub mod cli;
pub mod commands;
pub mod detector;
pub mod errors;
pub mod prompts;
pub mod session;

pub use agent::{AgentService, ConversationTurn};
pub use detector::{Detection, ToolCallDetector, TOOL_CALL_MARKER};
pub use errors::{AgentError, SessionError};
pub use session::{LocalToolSession, McpSession, ToolReply, ToolSession};
