//! Query orchestrator
//!
//! Drives one user query through the gateway, executes any requested tools on
//! the session, and asks the gateway for a follow-up after each tool result.
//! Tool chaining is one hop deep: tool calls in a follow-up reply are not
//! executed.

use std::sync::Arc;
use tracing::debug;

use crate::agent::conversation::Conversation;
use crate::agent::query_state::{QueryPhase, QueryState};
use crate::core::Result;
use crate::llm::LLMProvider;
use crate::mcp::ToolSession;
use crate::tools::ToolRegistry;

/// Mediates between the session and the gateway for each query
pub struct Agent {
    /// Inference gateway
    llm: Arc<dyn LLMProvider>,
    /// Remote tool session
    session: Arc<dyn ToolSession>,
}

impl Agent {
    /// Create an agent over a gateway and a session handle
    pub fn new(llm: Arc<dyn LLMProvider>, session: Arc<dyn ToolSession>) -> Self {
        Self { llm, session }
    }

    /// Answer one query and return the transcript text
    ///
    /// Errors from the gateway or the session propagate unchanged.
    pub async fn process(&self, query: &str) -> Result<String> {
        let mut conversation = Conversation::with_user(query);
        let mut state = QueryState::new();

        let registry = ToolRegistry::from_descriptors(self.session.list_tools().await?);
        let definitions = registry.definitions();

        debug!(
            target: "agent",
            provider = self.llm.name(),
            phase = %state.phase,
            tools = definitions.len(),
            "Sending query"
        );
        let reply = self
            .llm
            .chat(conversation.messages(), Some(definitions.as_slice()))
            .await?;
        state.record_initial_reply(&reply.content);

        state.enter(QueryPhase::InspectingToolCalls);
        debug!(target: "agent", tool_calls = reply.tool_calls.len(), "Inspecting reply");

        for call in &reply.tool_calls {
            state.enter(QueryPhase::InvokingTool);
            let arguments = registry.validate(call)?;
            let output = self.session.call_tool(&call.name, &arguments).await?;
            state.record_trace(call.trace_line());

            state.enter(QueryPhase::AppendingResult);
            if let Some(text) = state.take_assistant_message() {
                conversation.add_assistant(text);
            }
            conversation.add_tool_result(call, output.content);

            state.enter(QueryPhase::AwaitingFollowup);
            let followup = self.llm.chat(conversation.messages(), None).await?;
            if !followup.tool_calls.is_empty() {
                debug!(
                    target: "agent",
                    tool = %call.name,
                    ignored = followup.tool_calls.len(),
                    "Follow-up requested more tools; not chaining"
                );
            }
            state.record_followup(followup.content);
        }

        debug!(target: "agent", tools_invoked = state.tools_invoked, "Query complete");
        Ok(state.finish())
    }

    /// Model the gateway is using
    pub fn model(&self) -> &str {
        self.llm.model()
    }
}
