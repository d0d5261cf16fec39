//! Tool manager for registering and executing tools

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use tracing::debug;

use crate::tool::{Tool, ToolDefinition, ToolResult};
use crate::Result;

/// Manager for registered tools
///
/// Handles tool registration, retrieval, and execution.
pub struct ToolManager {
    /// Registered tools indexed by name
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolManager {
    /// Create a new empty tool manager
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Get all registered tool definitions, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Execute a tool by name
    ///
    /// # Arguments
    /// * `name` - The name of the tool to execute
    /// * `input` - The input parameters for the tool
    ///
    /// # Errors
    /// Returns an error if the tool is not found or execution fails
    pub async fn execute(&self, name: &str, input: JsonValue) -> Result<ToolResult> {
        let tool = self.get(name).ok_or_else(|| {
            crate::Error::ToolExecution(format!("Unknown tool: {}", name))
        })?;
        debug!(tool = name, "executing tool");
        tool.execute(input).await
    }

    /// Check if a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all registered tool names, sorted
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercases text"
        }

        fn input_schema(&self) -> JsonValue {
            crate::tool::SchemaBuilder::single_string("text", "Text")
        }

        async fn execute(&self, input: JsonValue) -> Result<ToolResult> {
            Ok(match crate::tool::string_input(&input, "text") {
                Some(text) => ToolResult::success(text.to_uppercase()),
                None => ToolResult::error("text is required"),
            })
        }
    }

    #[tokio::test]
    async fn test_register_and_execute() {
        let mut manager = ToolManager::new();
        assert!(manager.is_empty());
        manager.register(Arc::new(UpperTool));

        assert!(manager.contains("upper"));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.tool_names(), vec!["upper"]);
        assert_eq!(manager.definitions()[0].description, "Uppercases text");

        let result = manager.execute("upper", json!("abc")).await.unwrap();
        assert_eq!(result, ToolResult::success("ABC"));

        let result = manager.execute("upper", json!({})).await.unwrap();
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let manager = ToolManager::default();
        let err = manager.execute("missing", json!("x")).await.unwrap_err();
        assert!(matches!(err, crate::Error::ToolExecution(_)));
    }
}
