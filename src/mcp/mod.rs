//! Model Context Protocol (MCP) integration
//!
//! Connects to an MCP server subprocess, discovers its tools and resources,
//! and invokes tools on the orchestrator's behalf.
//!
//! - `script`: validates the server script and picks its launcher
//! - `client`: stdio JSON-RPC client with a background reader
//! - `session`: the `ToolSession` seam used by the orchestrator
//! - `types`: MCP protocol types (JSON-RPC 2.0 based)

pub mod client;
pub mod script;
pub mod session;
pub mod types;

pub use client::McpClient;
pub use script::{Launcher, ServerScript};
pub use session::ToolSession;
pub use types::{Implementation, Resource, ResourceContents, ResourceTemplate};
