use llm::LlmError;
use thiserror::Error;

/// Failures of the tool-execution boundary. Tool-level failures (missing
/// files, unknown tools) are not errors here; they arrive as replies.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to start MCP server '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("MCP handshake failed: {0}")]
    Handshake(String),

    #[error("MCP transport error: {0}")]
    Transport(String),

    #[error("MCP session is closed")]
    Closed,
}

impl From<rmcp::ServiceError> for SessionError {
    fn from(error: rmcp::ServiceError) -> Self {
        match error {
            rmcp::ServiceError::TransportClosed => SessionError::Closed,
            other => SessionError::Transport(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM service error: {0}")]
    Llm(#[from] LlmError),

    #[error("Session management error: {0}")]
    Session(#[from] SessionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Returns true if the error is potentially recoverable with a retry.
    /// Informational only: nothing in the agent retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Llm(error) => error.is_retryable(),
            AgentError::Session(SessionError::Transport(_)) => true,
            AgentError::Session(_) => false,
            AgentError::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_correct_retryable_flags() {
        let unavailable = LlmError::Status {
            service: "Ollama",
            status: 503,
            body: "loading model".to_string(),
        };
        let missing_model = LlmError::Status {
            service: "Ollama",
            status: 404,
            body: "model not found".to_string(),
        };
        let broken_pipe = SessionError::Transport("broken pipe".to_string());

        assert!(AgentError::from(unavailable).is_retryable());
        assert!(!AgentError::from(missing_model).is_retryable());
        assert!(AgentError::from(broken_pipe).is_retryable());
        assert!(!AgentError::from(SessionError::Closed).is_retryable());
        assert!(!AgentError::Config("bad host".to_string()).is_retryable());
    }

    #[test]
    fn should_format_nested_messages() {
        let error = AgentError::from(SessionError::Handshake("unexpected EOF".to_string()));
        assert_eq!(
            error.to_string(),
            "Session management error: MCP handshake failed: unexpected EOF"
        );

        let spawn = SessionError::Spawn {
            command: "fs-mcp-server".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            spawn.to_string(),
            "Failed to start MCP server 'fs-mcp-server': not found"
        );
    }

    #[test]
    fn should_map_closed_transport() {
        let error = SessionError::from(rmcp::ServiceError::TransportClosed);
        assert!(matches!(error, SessionError::Closed));
    }
}
