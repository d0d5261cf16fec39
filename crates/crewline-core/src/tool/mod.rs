//! Tool system
//!
//! Tools are the side-effecting capabilities specialists invoke before
//! answering. Each tool takes a single string argument.

pub mod definition;
pub mod manager;
pub mod traits;

pub use definition::{string_input, SchemaBuilder, ToolDefinition};
pub use manager::ToolManager;
pub use traits::{Tool, ToolResult};
