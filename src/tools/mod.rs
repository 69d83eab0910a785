//! Tools module - typed view of the session's tools
//!
//! Contains the tool registry and the argument schemas it validates with.

pub mod registry;
pub mod schema;

pub use registry::ToolRegistry;
pub use schema::{ArgumentSchema, JsonType};
