//! Per-query conversation
//!
//! Append-only message list owned by the orchestrator for one query.

use crate::core::{Message, ToolCall};

/// Messages exchanged while answering one query
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a new conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with the user's query
    pub fn with_user(content: impl Into<String>) -> Self {
        let mut conv = Self::new();
        conv.add_user(content);
        conv
    }

    /// Add a user message
    pub fn add_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Add an assistant message
    pub fn add_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Add the result of `call`, correlated by its id
    pub fn add_tool_result(&mut self, call: &ToolCall, content: impl Into<String>) {
        self.messages.push(Message::tool_result(call, content));
    }

    /// All messages in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
