//! The fixed two-tool registry exposed by the introspection surface.

use rmcp::model::{JsonObject, Tool};
use serde_json::json;
use std::sync::Arc;

pub const LIST_ENDPOINTS: &str = "list_endpoints";
pub const GET_ENDPOINT_DOCS: &str = "get_endpoint_docs";

/// Descriptors for the two introspection tools.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: vec![list_endpoints_tool(), get_endpoint_docs_tool()],
        }
    }

    #[must_use]
    pub fn descriptors(&self) -> &[Tool] {
        &self.tools
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn list_endpoints_tool() -> Tool {
    let schema = json!({
        "type": "object",
        "properties": {},
        "required": [],
    });
    Tool::new(
        LIST_ENDPOINTS,
        "List all user-defined endpoints with their methods, names, \
         summaries and tags.",
        Arc::new(schema.as_object().cloned().unwrap_or_else(JsonObject::new)),
    )
}

fn get_endpoint_docs_tool() -> Tool {
    let schema = json!({
        "type": "object",
        "properties": {
            "endpoint_path": {
                "type": "string",
                "description": "Path template of the endpoint, e.g. /users/{user_id}",
            },
            "method": {
                "type": "string",
                "description": "HTTP method (default GET)",
                "default": "GET",
            },
        },
        "required": ["endpoint_path"],
    });
    Tool::new(
        GET_ENDPOINT_DOCS,
        "Get complete documentation for one endpoint: parameters, request \
         body, responses and the raw OpenAPI fragment.",
        Arc::new(schema.as_object().cloned().unwrap_or_else(JsonObject::new)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_exposes_exactly_two_tools() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.descriptors().len(), 2);
        assert!(registry.contains(LIST_ENDPOINTS));
        assert!(registry.contains(GET_ENDPOINT_DOCS));
        assert!(!registry.contains("call_endpoint"));
    }

    #[test]
    fn docs_tool_requires_endpoint_path() {
        let registry = ToolRegistry::new();
        let tool = registry
            .descriptors()
            .iter()
            .find(|t| t.name == GET_ENDPOINT_DOCS)
            .unwrap();

        let required = tool.input_schema.get("required").unwrap();
        assert_eq!(required, &json!(["endpoint_path"]));
        let method = tool
            .input_schema
            .get("properties")
            .and_then(|p| p.get("method"))
            .unwrap();
        assert_eq!(method.get("default"), Some(&json!("GET")));
    }
}
