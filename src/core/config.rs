//! Configuration management for toolrelay
//!
//! Supports environment variables, an optional config file, and CLI overrides.
//!
//! Config file location: ~/.config/toolrelay/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{RelayError, Result};

/// Default Ollama model
pub const DEFAULT_MODEL: &str = "llama3";

/// Default MCP protocol version
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Main configuration for toolrelay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ollama configuration
    pub ollama: OllamaConfig,
    /// Model configuration
    pub model: ModelConfig,
    /// MCP session configuration
    pub session: SessionConfig,
    /// Logging configuration
    pub log: LogConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Host address (default: localhost)
    pub host: String,
    /// Port number (default: 11434)
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name passed to the chat endpoint
    /// Default: llama3
    pub name: String,
    /// Sent as `max_tokens` on every chat request
    pub max_tokens: u32,
}

/// MCP session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Protocol version sent during the handshake
    pub protocol_version: String,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether to log at debug level
    pub debug: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434),
            timeout_secs: 120,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: env::var("TOOLRELAY_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_tokens: 1000,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
        }
    }
}

impl LogConfig {
    /// Debug flag from the environment
    fn from_env() -> Self {
        Self {
            debug: env::var("TOOLRELAY_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toolrelay")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let mut config = Self::load_from_file().unwrap_or_default();
        config.log.debug |= LogConfig::from_env().debug;
        config
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(RelayError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| RelayError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text, filling gaps with defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RelayError::config(format!("Failed to parse config: {}", e)))
    }

    /// Get the full Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Get the chat completion endpoint
    pub fn chat_endpoint(&self) -> String {
        format!("{}/api/chat", self.ollama_url())
    }

    /// Override the model name
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model.name = model.into();
    }

    /// Tracing filter directive derived from the config
    pub fn log_filter(&self) -> &'static str {
        if self.log.debug {
            "debug"
        } else {
            "warn,toolrelay=info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ollama.timeout_secs, 120);
        assert_eq!(config.model.max_tokens, 1000);
        assert_eq!(config.session.request_timeout_secs, 30);
        assert_eq!(config.session.protocol_version, "2024-11-05");
    }

    #[test]
    fn test_chat_endpoint() {
        let mut config = Config::default();
        config.ollama.host = "localhost".to_string();
        config.ollama.port = 11434;
        assert_eq!(config.chat_endpoint(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [model]
            name = "qwen3:8b"

            [session]
            request_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.model.name, "qwen3:8b");
        assert_eq!(config.model.max_tokens, 1000);
        assert_eq!(config.session.request_timeout_secs, 5);
        assert_eq!(config.session.protocol_version, DEFAULT_PROTOCOL_VERSION);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = Config::from_toml("model = [").unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("toolrelay"));
    }

    #[test]
    fn test_log_filter() {
        let mut config = Config::default();
        config.log.debug = true;
        assert_eq!(config.log_filter(), "debug");
    }
}
