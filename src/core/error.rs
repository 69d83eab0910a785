//! Custom error types for toolrelay
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for toolrelay operations
#[derive(Error, Debug)]
pub enum RelayError {
    /// Bad command-line input, raised before any resource is acquired
    #[error("Invalid argument: {0}")]
    ArgumentValidation(String),

    /// MCP server unreachable, handshake failure, or a broken transport
    #[error("Connection error: {0}")]
    Connection(String),

    /// Non-success HTTP status from the inference endpoint
    #[error("Gateway error ({status}): {body}")]
    Gateway { status: u16, body: String },

    /// Ollama unreachable or returned something we could not parse
    #[error("Ollama error: {0}")]
    Ollama(String),

    /// Unknown tool, or the remote operation itself failed
    #[error("Tool invocation error: {0}")]
    ToolInvocation(String),

    /// Tool arguments rejected by the tool's input schema
    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// Malformed MCP message
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// MCP request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for toolrelay operations
pub type Result<T> = std::result::Result<T, RelayError>;

impl RelayError {
    /// Create an argument validation error
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::ArgumentValidation(msg.into())
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create an Ollama error
    pub fn ollama(msg: impl Into<String>) -> Self {
        Self::Ollama(msg.into())
    }

    /// Create a tool invocation error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolInvocation(msg.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error means the session itself is unusable
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
