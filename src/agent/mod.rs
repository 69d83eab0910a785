//! Agent module - query orchestration
//!
//! Contains the logic that coordinates gateway calls and tool execution.

pub mod conversation;
pub mod orchestrator;
pub mod query_state;

pub use conversation::Conversation;
pub use orchestrator::Agent;
pub use query_state::{QueryPhase, QueryState};
