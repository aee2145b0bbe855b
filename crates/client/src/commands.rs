use crate::agent::AgentService;
use crate::session::{McpSession, ToolSession};
use anyhow::{Context, Result};
use llm::{mask_key, ModelConfig, OllamaClient, OpenRouterClient, OpenRouterSettings};
use ollama_mcp_core::Config;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::runtime::Handle;
use tracing::{info, warn};

pub const DEMO_REQUESTS: [&str; 4] = [
    "list the contents of the current directory",
    "create a file demo.txt with the text 'Hello from MCP!'",
    "read the file demo.txt",
    "show information about the file demo.txt",
];

/// Loads the TOML config (explicit path, `CONFIG_PATH`, or the default path)
/// and applies environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = Config::load_or_default(&Config::config_path(path))?;
    Ok(config.with_env_overrides())
}

/// Non-fatal check that Ollama is up and has the configured model.
pub async fn preflight(config: &Config) {
    let client = match OllamaClient::new(ModelConfig::from(&config.ollama)) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "could not build Ollama client");
            return;
        }
    };
    let model = &client.config().model;

    match client.health_check().await {
        Ok(models) if client.has_model(&models) => {
            info!(model = %model, "Ollama is running");
        }
        Ok(_) => warn!("model {model} is not installed; run `ollama pull {model}`"),
        Err(e) => warn!(
            error = %e,
            "Ollama does not appear to be running; start it with `ollama serve`"
        ),
    }
}

fn tool_names(agent: &AgentService) -> Vec<&str> {
    agent.tools().iter().map(|t| t.name.as_str()).collect()
}

/// Chat input from stdin. Lines are read on a plain thread and forwarded
/// through an in-memory pipe, so a pending read never holds up runtime shutdown.
pub fn stdin_reader() -> BufReader<DuplexStream> {
    let (mut writer, reader) = tokio::io::duplex(4096);
    let handle = Handle::current();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else {
                break;
            };
            let sent = handle.block_on(writer.write_all(format!("{line}\n").as_bytes()));
            if sent.is_err() {
                break;
            }
        }
    });
    BufReader::new(reader)
}

/// Reads one request per line until `quit`, `exit`, end of input, or Ctrl-C.
pub async fn run_chat<R, W>(agent: &AgentService, reader: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "Available tools: {:?}", tool_names(agent))?;
    writeln!(
        out,
        "Interactive chat (type 'quit' or 'exit' to leave). Try:"
    )?;
    for example in DEMO_REQUESTS {
        writeln!(out, "  - {example}")?;
    }

    let mut lines = reader.lines();
    loop {
        write!(out, "\nYou: ")?;
        out.flush()?;

        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                writeln!(out)?;
                break;
            }
            line = lines.next_line() => line.context("Failed to read chat input")?,
        };

        let Some(line) = line else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }

        writeln!(out, "Thinking...")?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                writeln!(out)?;
                break;
            }
            reply = agent.chat_with_tools(input) => writeln!(out, "Assistant: {reply}")?,
        }
    }

    writeln!(out, "Goodbye.")?;
    Ok(())
}

pub async fn run_demo(agent: &AgentService) -> Result<()> {
    println!("MCP + Ollama demo");
    println!("{}", "=".repeat(50));
    println!("Available tools: {:?}", tool_names(agent));

    for (i, request) in DEMO_REQUESTS.iter().enumerate() {
        println!("\nDemo {}: {request}", i + 1);
        let turn = agent.run_turn(request).await;
        if let Some(call) = &turn.tool_call {
            println!("Tool: {} {}", call.name, call.arguments_json());
        }
        println!("Reply: {}", turn.final_reply);

        if i + 1 < DEMO_REQUESTS.len() {
            println!("\n{}", "-".repeat(30));
        }
    }

    println!("\nDemo finished.");
    Ok(())
}

pub async fn run_ask(agent: &AgentService, message: &str) -> Result<()> {
    println!("{}", agent.chat_with_tools(message).await);
    Ok(())
}

/// Reports on every collaborator; fails if any check failed.
pub async fn run_doctor(config: &Config, in_process: bool) -> Result<()> {
    let mut problems = 0;

    let client = OllamaClient::new(ModelConfig::from(&config.ollama))?;
    let ModelConfig { host, model, .. } = client.config();
    match client.health_check().await {
        Ok(models) => {
            println!("[ok] Ollama reachable at {host} ({} models)", models.len());
            if client.has_model(&models) {
                println!("[ok] model {model} installed");
            } else {
                problems += 1;
                println!("[!!] model {model} missing; run `ollama pull {model}`");
            }
        }
        Err(e) => {
            problems += 1;
            println!("[!!] {e}");
        }
    }

    if in_process {
        println!("[ok] tools run in-process");
    } else {
        match McpSession::connect(&config.mcp).await {
            Ok(session) => {
                let name = session.server_name().await.unwrap_or_default();
                match session.list_tools().await {
                    Ok(tools) => println!("[ok] MCP server {name} ({} tools)", tools.len()),
                    Err(e) => {
                        problems += 1;
                        println!("[!!] {e}");
                    }
                }
                session.close().await.ok();
            }
            Err(e) => {
                problems += 1;
                println!("[!!] {e}");
            }
        }
    }

    if problems > 0 {
        anyhow::bail!("{problems} check(s) failed");
    }
    Ok(())
}

/// Tries every configured key `rounds` times, writing one line per attempt.
/// Returns the number of failed attempts.
pub async fn check_keys<F, W>(
    config: &Config,
    rounds: u32,
    lookup: F,
    out: &mut W,
) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    let settings = &config.openrouter;
    let client = OpenRouterClient::new(OpenRouterSettings::from(settings))?;
    let mut failures = 0;

    for round in 1..=rounds {
        for var in &settings.key_env_vars {
            let Some(key) = lookup(var).filter(|k| !k.trim().is_empty()) else {
                failures += 1;
                writeln!(out, "[{round}] {var}: not set")?;
                continue;
            };

            match client.check_key(&key, &settings.check_prompt).await {
                Ok(reply) => writeln!(out, "[{round}] {var} ({}): {reply}", mask_key(&key))?,
                Err(e) => {
                    failures += 1;
                    writeln!(out, "[{round}] {var} ({}): {e}", mask_key(&key))?;
                }
            }
        }
    }

    Ok(failures)
}

pub async fn run_check_keys(config: &Config, rounds: u32) -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!(error = %e, "could not read .env");
        }
    }

    let mut stdout = std::io::stdout();
    let failures = check_keys(config, rounds, |var| std::env::var(var).ok(), &mut stdout).await?;
    if failures > 0 {
        anyhow::bail!("{failures} key check(s) failed");
    }
    Ok(())
}
