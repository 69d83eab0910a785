//! Ollama client implementation
//!
//! Async HTTP client for the Ollama chat API with tool calling support.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::core::{Config, Message, RelayError, Result, ToolCall, ToolDefinition};
use crate::llm::traits::{LLMProvider, LLMResponse, TokenUsage};

/// Longest body excerpt written to the debug log
const LOG_EXCERPT_CHARS: usize = 500;

/// Ollama API client
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
}

/// Ollama message format (response side)
#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Option<Vec<OllamaToolCall>>,
}

/// Ollama tool call format
#[derive(Debug, Deserialize)]
struct OllamaToolCall {
    #[serde(default)]
    id: Option<String>,
    function: OllamaFunction,
}

/// Ollama function in tool call
#[derive(Debug, Deserialize)]
struct OllamaFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Ollama chat response (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: OllamaMessage,
    #[serde(default)]
    model: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.ollama.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.ollama_url(),
            model: config.model.name.clone(),
            max_tokens: config.model.max_tokens,
        })
    }

    /// Create a client with custom base URL and model
    pub fn with_base_url(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let mut config = Config::default();
        config.set_model(model);
        let mut client = Self::from_config(&config)?;
        client.base_url = base_url.into();
        Ok(client)
    }

    /// Chat endpoint URL
    pub fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    /// Normalise the arguments payload into a JSON object
    ///
    /// Some models send arguments as a JSON-encoded string; Ollama usually
    /// sends an object. A missing payload becomes an empty object.
    fn normalize_arguments(arguments: Value) -> Value {
        match arguments {
            Value::Null => Value::Object(Default::default()),
            Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(parsed @ Value::Object(_)) => parsed,
                _ => Value::String(raw),
            },
            other => other,
        }
    }

    /// Convert Ollama response to LLMResponse
    fn to_llm_response(response: ChatResponse) -> LLMResponse {
        let tool_calls = response
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                name: tc.function.name,
                arguments: Self::normalize_arguments(tc.function.arguments),
                id: tc.id,
            })
            .collect();

        let usage = match (response.prompt_eval_count, response.eval_count) {
            (Some(prompt), Some(completion)) => Some(TokenUsage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt.saturating_add(completion),
            }),
            _ => None,
        };

        LLMResponse {
            content: response.message.content,
            tool_calls,
            usage,
            model: response.model,
        }
    }

    /// Debug log with the body truncated
    fn debug_excerpt(label: &str, content: &str) {
        if content.chars().count() > LOG_EXCERPT_CHARS {
            let excerpt: String = content.chars().take(LOG_EXCERPT_CHARS).collect();
            debug!(target: "ollama", "{}: {}...", label, excerpt);
        } else {
            debug!(target: "ollama", "{}: {}", label, content);
        }
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LLMResponse> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            max_tokens: self.max_tokens,
            tools: tools.filter(|t| !t.is_empty()),
        };

        let request_json = serde_json::to_string(&request)?;
        Self::debug_excerpt("Request", &request_json);

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RelayError::ollama(format!(
                        "Cannot connect to Ollama at {}. Is it running?",
                        self.base_url
                    ))
                } else {
                    RelayError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Gateway { status, body });
        }

        let response_text = response.text().await?;
        Self::debug_excerpt("Response", &response_text);

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| RelayError::ollama(format!("Failed to parse response: {}", e)))?;

        Ok(Self::to_llm_response(chat_response))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
