//! Tool registry - typed capability table for one tool listing
//!
//! Maps each tool name to its descriptor and compiled argument schema, and
//! checks tool calls before they are forwarded to the session.

use std::collections::HashMap;
use tracing::warn;

use crate::core::{RelayError, Result, ToolArguments, ToolCall, ToolDefinition, ToolDescriptor};
use crate::tools::schema::ArgumentSchema;

/// A registered tool
#[derive(Debug, Clone)]
struct RegisteredTool {
    descriptor: ToolDescriptor,
    schema: ArgumentSchema,
}

/// Registry of tools available for the current query
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    /// Tools indexed by name
    tools: HashMap<String, RegisteredTool>,
    /// Names in listing order
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a session listing
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor);
        }
        registry
    }

    /// Register a tool; a repeated name keeps the first entry
    pub fn register(&mut self, descriptor: ToolDescriptor) -> bool {
        if self.tools.contains_key(&descriptor.name) {
            warn!(target: "agent", tool = %descriptor.name, "Duplicate tool name in listing, ignoring");
            return false;
        }

        let schema = ArgumentSchema::compile(&descriptor.input_schema);
        self.order.push(descriptor.name.clone());
        self.tools.insert(
            descriptor.name.clone(),
            RegisteredTool { descriptor, schema },
        );
        true
    }

    /// Get a descriptor by name
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name).map(|t| &t.descriptor)
    }

    /// Tool names in listing order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Function definitions for the gateway, in listing order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.descriptor.to_definition())
            .collect()
    }

    /// Check a call against the named tool's schema
    pub fn validate(&self, call: &ToolCall) -> Result<ToolArguments> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| RelayError::tool(format!("Unknown tool: {}", call.name)))?;

        tool.schema
            .validate(&call.arguments)
            .map(ToolArguments::new)
            .map_err(|reason| RelayError::invalid_arguments(&call.name, reason))
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
