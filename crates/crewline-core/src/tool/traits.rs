//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::Result;

/// Tool execution result
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Output string from tool execution
    pub output: String,
    /// Whether the execution resulted in an error
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: true,
        }
    }
}

/// A named capability a specialist can invoke.
///
/// Built-in tools never return `Err` for bad input; malformed arguments
/// become a [`ToolResult::error`] so the specialist can still answer.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name (the key specialists bind to)
    fn name(&self) -> &str;

    /// Get the tool description
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's input parameters
    fn input_schema(&self) -> JsonValue;

    /// Execute the tool with the given input
    ///
    /// `input` is either a bare JSON string or an object carrying the
    /// field named in the schema.
    async fn execute(&self, input: JsonValue) -> Result<ToolResult>;
}
