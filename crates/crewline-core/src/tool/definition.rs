//! Tool definition helpers

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Describes a registered tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: JsonValue,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: JsonValue,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Helper functions for creating tool schemas
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Object schema with one required string property
    ///
    /// ```ignore
    /// let schema = SchemaBuilder::single_string("query", "Search query");
    /// ```
    pub fn single_string(name: &str, description: &str) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                name: {"type": "string", "description": description}
            },
            "required": [name]
        })
    }
}

/// Pull the single string argument out of a tool input.
///
/// Accepts a bare JSON string or an object with `field`. Returns `None`
/// for anything else, including blank strings.
pub fn string_input<'a>(input: &'a JsonValue, field: &str) -> Option<&'a str> {
    let value = match input {
        JsonValue::String(s) => s.as_str(),
        JsonValue::Object(map) => map.get(field)?.as_str()?,
        _ => return None,
    };
    let value = value.trim();
    if value.is_empty() { None } else { Some(value) }
}
