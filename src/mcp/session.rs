//! Session abstraction over a remote tool host

use async_trait::async_trait;

use crate::core::{Result, ToolArguments, ToolDescriptor, ToolOutput};

/// A live connection exposing tool listing and invocation
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Current tool set, in the order the remote reports it
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;

    /// Invoke a named tool with validated arguments
    async fn call_tool(&self, name: &str, arguments: &ToolArguments) -> Result<ToolOutput>;
}
