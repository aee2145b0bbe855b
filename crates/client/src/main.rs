use clap::Parser;
use client::cli::{Cli, Command};
use client::{commands, AgentService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ollama_mcp_core::logging::init("info");

    let cli = Cli::parse();
    let mut config = commands::load_config(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        config.ollama.model = model;
    }
    if let Some(host) = cli.host {
        config.ollama.host = host;
    }

    let command = cli.command.unwrap_or(Command::Chat);
    match command {
        Command::Doctor => return commands::run_doctor(&config, cli.in_process).await,
        Command::CheckKeys { rounds } => return commands::run_check_keys(&config, rounds).await,
        Command::Chat | Command::Demo | Command::Ask { .. } => {}
    }

    if !matches!(command, Command::Ask { .. }) {
        commands::preflight(&config).await;
    }

    let agent = AgentService::connect(&config, cli.in_process).await?;
    let outcome = match &command {
        Command::Demo => commands::run_demo(&agent).await,
        Command::Ask { message } => commands::run_ask(&agent, &message.join(" ")).await,
        _ => commands::run_chat(&agent, commands::stdin_reader(), &mut std::io::stdout()).await,
    };

    if let Err(e) = agent.shutdown().await {
        tracing::warn!(error = %e, "failed to close tool session");
    }
    outcome
}
