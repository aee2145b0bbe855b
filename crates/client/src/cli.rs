use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chat with a local Ollama model that can use filesystem tools over MCP.
#[derive(Parser, Debug)]
#[command(name = "ollama-mcp", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path to the TOML config file. Defaults to `CONFIG_PATH` or
    /// `./ollama-mcp.toml`.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Ollama model to use, overriding the config.
    #[arg(long, short = 'm', global = true)]
    pub model: Option<String>,

    /// Ollama base URL, overriding the config.
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Run the tools inside this process instead of spawning the MCP server.
    #[arg(long, default_value_t = false, global = true)]
    pub in_process: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive chat (default).
    Chat,
    /// Run the fixed demo requests.
    Demo,
    /// Answer a single message and exit.
    Ask {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Check Ollama, the configured model and the MCP server.
    Doctor,
    /// Check the configured OpenRouter API keys.
    CheckKeys {
        #[arg(long, default_value_t = 1)]
        rounds: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_chat_without_subcommand() {
        let cli = Cli::parse_from(["ollama-mcp"]);
        assert!(cli.command.is_none());
        assert!(!cli.in_process);
    }

    #[test]
    fn should_parse_ask_with_overrides() {
        let args = "ollama-mcp --model qwen2.5:7b ask --in-process list files";
        let cli = Cli::parse_from(args.split(' '));

        assert_eq!(cli.model.as_deref(), Some("qwen2.5:7b"));
        assert!(cli.in_process);
        assert_eq!(
            cli.command,
            Some(Command::Ask {
                message: vec!["list".to_string(), "files".to_string()],
            })
        );
    }

    #[test]
    fn should_parse_check_keys_rounds() {
        let cli = Cli::parse_from(["ollama-mcp", "check-keys", "--rounds", "3"]);
        assert_eq!(cli.command, Some(Command::CheckKeys { rounds: 3 }));
    }
}
