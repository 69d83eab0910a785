//! toolrelay - MCP client for Ollama models
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::sync::Arc;
use toolrelay::llm::OllamaClient;
use toolrelay::mcp::{McpClient, ServerScript, ToolSession};
use toolrelay::{Agent, Config, Repl};
use tracing::info;

/// MCP client for Ollama models
#[derive(Parser, Debug)]
#[command(name = "toolrelay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server script (.py or .js)
    #[arg(value_parser = ServerScript::parse)]
    server_script: ServerScript,

    /// Ollama model name (default: llama3)
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Validated before anything is acquired
    let args = Args::parse();

    let mut config = Config::load();
    if let Some(model) = args.model {
        config.set_model(model);
    }

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_filter().to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let llm = Arc::new(OllamaClient::from_config(&config)?);
    let session = Arc::new(McpClient::connect(&args.server_script, &config.session).await?);

    let outcome = run(&config, llm, Arc::clone(&session)).await;

    session.close().await;

    // The blocking stdin read cannot be cancelled; exit instead of waiting
    // for the runtime to join it.
    if let Ok(Ending::Interrupted) = outcome {
        std::process::exit(130);
    }
    outcome.map(|_| ())
}

/// How the interactive loop ended
enum Ending {
    Finished,
    Interrupted,
}

/// Announce the tools, then drive the REPL until quit, EOF, or Ctrl+C
async fn run(
    config: &Config,
    llm: Arc<OllamaClient>,
    session: Arc<McpClient>,
) -> anyhow::Result<Ending> {
    let tools = session.list_tools().await?;
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    info!(target: "toolrelay", tools = ?names, "Connected to server");
    println!("\nConnected to server with tools: {:?}", names);

    if let Some(server) = session.server_info().await {
        info!(target: "toolrelay", name = %server.name, version = %server.version, "Server info");
    }

    let repl = Repl::new(Agent::new(llm, session));
    info!(target: "toolrelay", model = %config.model.name, "Starting interactive loop");

    tokio::select! {
        result = repl.run() => {
            result?;
            Ok(Ending::Finished)
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
            info!(target: "toolrelay", "Interrupted");
            Ok(Ending::Interrupted)
        }
    }
}
