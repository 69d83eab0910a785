//! toolrelay - local model meets MCP tools
//!
//! Connects to an MCP server subprocess, relays user queries to a local
//! Ollama model, and runs the tools the model asks for on the server.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **MCP**: Session transport to the tool-hosting process
//! - **Tools**: Typed registry validating tool calls against their schemas
//! - **LLM**: Inference gateway abstraction with the Ollama implementation
//! - **Agent**: Per-query orchestration
//! - **CLI**: Interactive loop
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use toolrelay::core::Config;
//! use toolrelay::llm::OllamaClient;
//! use toolrelay::mcp::{McpClient, ServerScript};
//! use toolrelay::Agent;
//!
//! #[tokio::main]
//! async fn main() -> toolrelay::Result<()> {
//!     let config = Config::load();
//!     let script = ServerScript::parse("demo_server.py")?;
//!     let session = Arc::new(McpClient::connect(&script, &config.session).await?);
//!     let llm = Arc::new(OllamaClient::from_config(&config)?);
//!
//!     let agent = Agent::new(llm, session.clone());
//!     println!("{}", agent.process("What is 2 + 3?").await?);
//!
//!     session.close().await;
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod mcp;
pub mod tools;

// Re-export commonly used items
pub use agent::Agent;
pub use cli::Repl;
pub use core::{Config, RelayError, Result};
