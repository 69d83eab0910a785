//! Query state tracking
//!
//! Tracks which phase the orchestrator is in and accumulates the transcript
//! lines returned to the user.

use std::fmt;
use tracing::trace;

/// Phase of a single query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    AwaitingReply,
    InspectingToolCalls,
    InvokingTool,
    AppendingResult,
    AwaitingFollowup,
    Done,
}

impl fmt::Display for QueryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryPhase::AwaitingReply => "awaiting_reply",
            QueryPhase::InspectingToolCalls => "inspecting_tool_calls",
            QueryPhase::InvokingTool => "invoking_tool",
            QueryPhase::AppendingResult => "appending_result",
            QueryPhase::AwaitingFollowup => "awaiting_followup",
            QueryPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// State of one query
#[derive(Debug, Clone)]
pub struct QueryState {
    /// Current phase
    pub phase: QueryPhase,
    /// Output lines, joined with newlines at the end
    output: Vec<String>,
    /// Text of the first reply, if any
    initial_reply: Option<String>,
    /// Whether the initial reply has been added to the conversation
    assistant_recorded: bool,
    /// Number of tool calls executed
    pub tools_invoked: usize,
}

impl QueryState {
    pub fn new() -> Self {
        Self {
            phase: QueryPhase::AwaitingReply,
            output: Vec::new(),
            initial_reply: None,
            assistant_recorded: false,
            tools_invoked: 0,
        }
    }

    /// Move to the next phase
    pub fn enter(&mut self, phase: QueryPhase) {
        trace!(target: "agent", from = %self.phase, to = %phase, "Query phase");
        self.phase = phase;
    }

    /// Record the first gateway reply; empty text is not recorded
    pub fn record_initial_reply(&mut self, content: &str) {
        if !content.is_empty() {
            self.output.push(content.to_string());
            self.initial_reply = Some(content.to_string());
        }
    }

    /// Record the trace line of an executed tool call
    pub fn record_trace(&mut self, line: String) {
        self.tools_invoked += 1;
        self.output.push(line);
    }

    /// Record a follow-up reply verbatim
    pub fn record_followup(&mut self, content: String) {
        self.output.push(content);
    }

    /// Initial reply text to add to the conversation, returned at most once
    pub fn take_assistant_message(&mut self) -> Option<String> {
        if self.assistant_recorded {
            return None;
        }
        let reply = self.initial_reply.clone()?;
        self.assistant_recorded = true;
        Some(reply)
    }

    /// Finish the query and return the joined output
    pub fn finish(mut self) -> String {
        self.enter(QueryPhase::Done);
        self.output.join("\n")
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new()
    }
}
