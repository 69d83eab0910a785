//! Shared types used across toolrelay modules
//!
//! Contains message structures, tool definitions, and tool call payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: String,
    /// Id of the tool call this message answers (tool messages only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_call_id: None,
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_call_id: None,
        }
    }

    /// Create a tool result message answering `call`
    ///
    /// The id falls back to the tool name when the gateway did not assign one.
    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: Some(call.correlation_id().to_string()),
        }
    }
}

/// A tool call made by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub arguments: Value,
    /// Call id assigned by the gateway, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
            id: None,
        }
    }

    /// Attach a gateway-assigned id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Id used to correlate the tool result with this call
    pub fn correlation_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Transcript line recorded when the call is executed
    pub fn trace_line(&self) -> String {
        format!("[Calling tool {} with args {}]", self.name, self.arguments)
    }
}

/// Definition of a tool that can be called by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (always "function" for now)
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function details
    pub function: FunctionDefinition,
}

/// Function definition within a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// A tool as advertised by the remote session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema", default = "empty_object_schema")]
    pub input_schema: Value,
}

fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object" })
}

impl ToolDescriptor {
    /// Convert into the function definition the gateway expects
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.name.clone(),
            self.description.clone().unwrap_or_default(),
            self.input_schema.clone(),
        )
    }
}

/// Tool arguments that passed schema validation
///
/// Only the tool registry constructs these, so a session never sees an
/// unchecked payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    pub(crate) fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Get an argument by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Convert into a JSON value for the wire
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Result of executing a remote tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Text output, content parts joined with newlines
    pub content: String,
}

impl ToolOutput {
    /// Create a successful output
    pub fn success(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_result_uses_call_id() {
        let call = ToolCall::new("add", json!({"a": 2, "b": 3})).with_id("call_1");
        let msg = Message::tool_result(&call, "5");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_tool_result_falls_back_to_name() {
        let call = ToolCall::new("add", json!({}));
        let msg = Message::tool_result(&call, "5");
        assert_eq!(msg.tool_call_id.as_deref(), Some("add"));
    }

    #[test]
    fn test_trace_line_contains_name_and_args() {
        let call = ToolCall::new("add", json!({"a": 2, "b": 3}));
        let line = call.trace_line();
        assert!(line.starts_with("[Calling tool add with args "));
        assert!(line.contains("\"a\":2"));
        assert!(line.contains("\"b\":3"));
    }

    #[test]
    fn test_message_serialization_skips_missing_id() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json, json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_descriptor_without_schema_defaults_to_object() {
        let desc: ToolDescriptor = serde_json::from_value(json!({"name": "ping"})).unwrap();
        assert_eq!(desc.input_schema, json!({"type": "object"}));
        assert_eq!(desc.to_definition().function.description, "");
    }
}
